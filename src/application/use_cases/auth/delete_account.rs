use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::domain::media::{MediaPolicies, SlotOwner};

/// Deletes the user row (tracks, projects and publications cascade) and
/// then every media file those records referenced.
pub struct DeleteAccount<'a, S, R>
where
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub store: &'a S,
    pub slots: &'a R,
    pub policies: &'a MediaPolicies,
}

impl<'a, S, R> DeleteAccount<'a, S, R>
where
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<usize, MediaError> {
        let media = MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        };
        let removed = media.delete_owner(SlotOwner::User(user_id)).await?;
        tracing::info!(user_id = %user_id, files = removed, "account_deleted");
        Ok(removed)
    }
}
