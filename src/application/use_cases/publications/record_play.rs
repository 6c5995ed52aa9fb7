use uuid::Uuid;

use crate::application::ports::publication_repository::PublicationRepository;

pub struct RecordPlay<'a, R: PublicationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PublicationRepository + ?Sized> RecordPlay<'a, R> {
    pub async fn execute(&self, id: Uuid) -> anyhow::Result<Option<i64>> {
        self.repo.increment_play_count(id).await
    }
}
