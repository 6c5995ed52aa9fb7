use uuid::Uuid;

use crate::application::ports::publication_repository::PublicationRepository;
use crate::domain::publications::publication::Publication;

pub struct ListMyPublications<'a, R: PublicationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PublicationRepository + ?Sized> ListMyPublications<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Vec<Publication>> {
        self.repo.list_for_user(user_id).await
    }
}
