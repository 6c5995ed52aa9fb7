use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::tracks::track::Track;

#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Track>>;
    async fn insert(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        audio_file: &str,
    ) -> anyhow::Result<Track>;
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Track>>;
    /// Writes title and audio path in one statement; `None` keeps the stored
    /// value. Returns `None` when the track is gone.
    async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        audio_file: Option<&str>,
    ) -> anyhow::Result<Option<Track>>;
}
