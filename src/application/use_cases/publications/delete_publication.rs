use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::publication_repository::PublicationRepository;
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::domain::media::{MediaPolicies, SlotOwner};

pub struct DeletePublication<'a, P, S, R>
where
    P: PublicationRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub publications: &'a P,
    pub store: &'a S,
    pub slots: &'a R,
    pub policies: &'a MediaPolicies,
}

impl<'a, P, S, R> DeletePublication<'a, P, S, R>
where
    P: PublicationRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), MediaError> {
        if self
            .publications
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
        .delete_owner(SlotOwner::Publication(id))
        .await?;
        Ok(())
    }
}
