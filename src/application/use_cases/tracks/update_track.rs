use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::track_repository::TrackRepository;
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::domain::media::{IncomingFile, MediaPolicies, MediaSlot, SlotKind, SlotOwner};
use crate::domain::tracks::track::Track;

use super::validate_title;

pub struct UpdateTrack<'a, T, S, R>
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

impl<'a, T, S, R> UpdateTrack<'a, T, S, R>
where
    T: TrackRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    /// Renames and/or replaces the audio of a track owned by `user_id`.
    /// Audio cannot be cleared: a track always has a file.
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        audio: Option<IncomingFile>,
    ) -> Result<Track, MediaError> {
        let title = title.map(validate_title).transpose()?;
        let media = MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        };
        if let Some(file) = &audio {
            media.validate(SlotKind::Audio, file)?;
        }

        let track = self
            .tracks
            .find_owned(id, user_id)
            .await
            .map_err(MediaError::Persistence)?
            .ok_or(MediaError::OwnerNotFound)?;

        let slot = MediaSlot::new(
            SlotOwner::Track(id),
            SlotKind::Audio,
            Some(track.audio_file.clone()),
        );
        let change = media.stage(&slot, audio.as_ref(), false).await?;
        if change.is_noop() && title.is_none() {
            return Ok(track);
        }

        // Title and audio path land in one write so a failure leaves both as they were.
        let new_path = change.stored.as_deref();
        let saved = match self.tracks.update(id, title.as_deref(), new_path).await {
            Ok(Some(track)) => track,
            Ok(None) => {
                media.abandon(&change).await;
                return Err(MediaError::OwnerNotFound);
            }
            Err(err) => {
                tracing::error!(track_id = %id, error = ?err, "track_update_failed");
                media.abandon(&change).await;
                return Err(MediaError::Persistence(err));
            }
        };

        if let Some(path) = media.commit(&change).await {
            tracing::debug!(track_id = %id, path = %path, "track_audio_released");
        }
        Ok(saved)
    }
}
