use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::track_repository::TrackRepository;
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::domain::media::{IncomingFile, MediaPolicies, MediaSlot, SlotKind, SlotOwner};
use crate::domain::tracks::track::Track;

use super::validate_title;

pub struct CreateTrack<'a, T, S, R>
where
    T: TrackRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub tracks: &'a T,
    pub store: &'a S,
    pub slots: &'a R,
    pub policies: &'a MediaPolicies,
}

impl<'a, T, S, R> CreateTrack<'a, T, S, R>
where
    T: TrackRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        title: &str,
        audio: Option<IncomingFile>,
    ) -> Result<Track, MediaError> {
        let title = validate_title(title)?;
        let audio =
            audio.ok_or_else(|| MediaError::Validation("No audio file was submitted.".into()))?;

        let media = MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        };
        let id = Uuid::new_v4();
        let slot = MediaSlot::empty(SlotOwner::Track(id), SlotKind::Audio);
        let change = media.stage(&slot, Some(&audio), false).await?;
        let Some(path) = change.slot.current_path.as_deref() else {
            return Err(MediaError::Validation("No audio file was submitted.".into()));
        };

        match self.tracks.insert(id, user_id, &title, path).await {
            Ok(track) => {
                tracing::info!(track_id = %track.id, user_id = %user_id, path = %path, "track_created");
                Ok(track)
            }
            Err(err) => {
                tracing::error!(user_id = %user_id, error = ?err, "track_insert_failed");
                media.abandon(&change).await;
                Err(MediaError::Persistence(err))
            }
        }
    }
}
