use async_trait::async_trait;

use crate::domain::media::{MediaSlot, SlotOwner};

#[async_trait]
pub trait MediaSlotRepository: Send + Sync {
    /// Every slot whose lifetime is bound to `owner`. For a user this also
    /// includes the slots of the tracks and publications deleted with it.
    async fn list_slots(&self, owner: SlotOwner) -> anyhow::Result<Vec<MediaSlot>>;
    /// Persists `slot.current_path`. Returns `false` if the owner row is gone.
    async fn save_slot(&self, slot: &MediaSlot) -> anyhow::Result<bool>;
    async fn delete_owner(&self, owner: SlotOwner) -> anyhow::Result<bool>;
    async fn is_path_referenced(&self, path: &str) -> anyhow::Result<bool>;
}
