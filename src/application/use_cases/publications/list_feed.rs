use crate::application::ports::publication_repository::PublicationRepository;
use crate::domain::publications::publication::Publication;

use super::{FEED_DEFAULT_LIMIT, FEED_MAX_LIMIT};

pub struct ListFeed<'a, R: PublicationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PublicationRepository + ?Sized> ListFeed<'a, R> {
    pub async fn execute(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> anyhow::Result<Vec<Publication>> {
        let limit = limit.unwrap_or(FEED_DEFAULT_LIMIT).clamp(1, FEED_MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        self.repo.list_public(limit, offset).await
    }
}
