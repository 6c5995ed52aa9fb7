use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::track_repository::TrackRepository;
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::domain::media::{MediaPolicies, SlotOwner};

pub struct DeleteTrack<'a, T, S, R>
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

impl<'a, T, S, R> DeleteTrack<'a, T, S, R>
where
    T: TrackRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), MediaError> {
        if self
            .tracks
            .find_owned(id, user_id)
            .await
            .map_err(MediaError::Persistence)?
            .is_none()
        {
            return Err(MediaError::OwnerNotFound);
        }
        MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        }
        .delete_owner(SlotOwner::Track(id))
        .await?;
        Ok(())
    }
}
