use uuid::Uuid;

use crate::application::ports::track_repository::TrackRepository;
use crate::domain::tracks::track::Track;

pub struct ListTracks<'a, R: TrackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TrackRepository + ?Sized> ListTracks<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Vec<Track>> {
        self.repo.list_for_user(user_id).await
    }
}
