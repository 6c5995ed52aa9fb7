use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::publications::publication::Publication;

#[derive(Debug, Clone)]
pub struct NewPublication<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: &'a str,
    pub description: &'a str,
    pub audio_file: &'a str,
    pub cover_image: Option<&'a str>,
    pub is_public: bool,
}

#[async_trait]
pub trait PublicationRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Publication>>;
    async fn insert(&self, new_pub: NewPublication<'_>) -> anyhow::Result<Publication>;
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Publication>>;
    /// Returns the new play count, `None` when the publication is not public or missing.
    async fn increment_play_count(&self, id: Uuid) -> anyhow::Result<Option<i64>>;
    async fn list_public(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Publication>>;
    async fn list_public_by_username(&self, username: &str) -> anyhow::Result<Vec<Publication>>;
    async fn project_belongs_to(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}
