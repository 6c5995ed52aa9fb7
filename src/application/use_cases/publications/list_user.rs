use crate::application::ports::publication_repository::PublicationRepository;
use crate::domain::publications::publication::Publication;

pub struct ListUserPublications<'a, R: PublicationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PublicationRepository + ?Sized> ListUserPublications<'a, R> {
    pub async fn execute(&self, username: &str) -> anyhow::Result<Vec<Publication>> {
        self.repo.list_public_by_username(username).await
    }
}
