//! Keeps uploaded media consistent with the records that own it.
//!
//! A record's new file reference is always persisted before the file it
//! replaces is removed from the object store. A crash in between leaves an
//! orphaned blob, never a record pointing at a deleted key. Cleanup of
//! released files is best-effort: failures are logged and swallowed because
//! the record mutation has already committed.
//!
//! Concurrent updates of the same slot are not serialized. The last record
//! write wins and the losing request's upload is leaked as an orphan.

use std::collections::BTreeSet;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::domain::media::{IncomingFile, MediaPolicies, MediaSlot, SlotKind, SlotOwner};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("{0}")]
    Validation(String),
    #[error("owner record not found")]
    OwnerNotFound,
    #[error("failed to persist media reference: {0}")]
    Persistence(#[source] anyhow::Error),
    #[error("failed to store uploaded file: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Outcome of resolving an update against a slot, before the owning
/// record is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    pub slot: MediaSlot,
    /// Path the slot let go of; deleted by `commit`.
    pub released: Option<String>,
    /// Path written to the store for this change; deleted by `abandon`.
    pub stored: Option<String>,
}

impl SlotChange {
    fn unchanged(slot: &MediaSlot) -> Self {
        Self {
            slot: slot.clone(),
            released: None,
            stored: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.released.is_none() && self.stored.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedSlot {
    pub slot: MediaSlot,
    pub removed_path: Option<String>,
}

pub struct MediaLifecycle<'a, S, R>
where
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub store: &'a S,
    pub slots: &'a R,
    pub policies: &'a MediaPolicies,
}

impl<'a, S, R> MediaLifecycle<'a, S, R>
where
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub fn validate(&self, kind: SlotKind, file: &IncomingFile) -> Result<(), MediaError> {
        self.policies
            .for_kind(kind)
            .check(kind, file)
            .map_err(MediaError::Validation)
    }

    /// Validate, resolve and upload, without touching the owning record.
    ///
    /// Removal wins over replacement: with `remove_requested` set the new
    /// file is never written, even when the slot is already empty.
    pub async fn stage(
        &self,
        slot: &MediaSlot,
        new_file: Option<&IncomingFile>,
        remove_requested: bool,
    ) -> Result<SlotChange, MediaError> {
        if let Some(file) = new_file {
            self.validate(slot.kind, file)?;
        }

        if remove_requested {
            return Ok(match slot.current_path.as_deref() {
                Some(current) => SlotChange {
                    slot: slot.with_path(None),
                    released: Some(current.to_string()),
                    stored: None,
                },
                None => SlotChange::unchanged(slot),
            });
        }

        let Some(file) = new_file else {
            return Ok(SlotChange::unchanged(slot));
        };

        let hint = slot
            .fresh_path(file)
            .map_err(|e| MediaError::Validation(e.to_string()))?;
        let stored = self
            .store
            .put(&hint, &file.bytes, &file.mime_essence())
            .await
            .map_err(|err| {
                tracing::error!(owner = %slot.owner, slot = %slot.kind, error = ?err, "media_store_failed");
                MediaError::Storage(err)
            })?;
        tracing::debug!(owner = %slot.owner, slot = %slot.kind, path = %stored, size = file.size(), "media_stored");

        // Fresh paths carry a random key; `commit` still refuses to release
        // a path the slot holds.
        Ok(SlotChange {
            slot: slot.with_path(Some(stored.clone())),
            released: slot.current_path.clone(),
            stored: Some(stored),
        })
    }

    /// Runs after the owning record has been persisted. Deletes the released
    /// path and returns it, or `None` when nothing was deleted.
    pub async fn commit(&self, change: &SlotChange) -> Option<String> {
        let released = change.released.as_deref()?;
        if change.slot.current_path.as_deref() == Some(released) {
            return None;
        }
        if self.release(released).await {
            Some(released.to_string())
        } else {
            None
        }
    }

    /// Runs when persisting the owning record failed. Removes the file
    /// uploaded by `stage` so the failed update leaves no orphan.
    pub async fn abandon(&self, change: &SlotChange) {
        let Some(stored) = change.stored.as_deref() else {
            return;
        };
        if let Err(err) = self.store.delete(stored).await {
            tracing::warn!(path = %stored, error = ?err, "media_abandon_delete_failed");
        }
    }

    pub async fn apply_update(
        &self,
        slot: &MediaSlot,
        new_file: Option<&IncomingFile>,
        remove_requested: bool,
    ) -> Result<UpdatedSlot, MediaError> {
        let change = self.stage(slot, new_file, remove_requested).await?;
        if change.is_noop() {
            return Ok(UpdatedSlot {
                slot: change.slot,
                removed_path: None,
            });
        }

        let saved = match self.slots.save_slot(&change.slot).await {
            Ok(saved) => saved,
            Err(err) => {
                tracing::error!(owner = %slot.owner, slot = %slot.kind, error = ?err, "media_persist_failed");
                self.abandon(&change).await;
                return Err(MediaError::Persistence(err));
            }
        };
        if !saved {
            self.abandon(&change).await;
            return Err(MediaError::OwnerNotFound);
        }

        let removed_path = self.commit(&change).await;
        Ok(UpdatedSlot {
            slot: change.slot,
            removed_path,
        })
    }

    /// Deletes the owning record, then every file its slots referenced.
    /// Returns the number of files handed to the store for deletion.
    pub async fn delete_owner(&self, owner: SlotOwner) -> Result<usize, MediaError> {
        let slots = self
            .slots
            .list_slots(owner)
            .await
            .map_err(MediaError::Persistence)?;
        let deleted = self
            .slots
            .delete_owner(owner)
            .await
            .map_err(MediaError::Persistence)?;
        if !deleted {
            return Err(MediaError::OwnerNotFound);
        }

        let paths: BTreeSet<String> = slots.into_iter().filter_map(|s| s.current_path).collect();
        let mut released = 0;
        for path in &paths {
            if self.release(path).await {
                released += 1;
            }
        }
        tracing::info!(owner = %owner, files = released, "media_owner_deleted");
        Ok(released)
    }

    /// Best-effort delete of a path no longer held by its slot. Skipped when
    /// another record still references the path (or that cannot be checked).
    async fn release(&self, path: &str) -> bool {
        match self.slots.is_path_referenced(path).await {
            Ok(false) => {}
            Ok(true) => {
                tracing::warn!(path = %path, "media_release_skipped_still_referenced");
                return false;
            }
            Err(err) => {
                tracing::warn!(path = %path, error = ?err, "media_reference_check_failed");
                return false;
            }
        }
        match self.store.delete(path).await {
            Ok(true) => tracing::debug!(path = %path, "media_deleted"),
            Ok(false) => tracing::debug!(path = %path, "media_delete_missing"),
            Err(err) => tracing::warn!(path = %path, error = ?err, "media_delete_failed"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Event, MemorySlots, MemoryStore, event_log};
    use uuid::Uuid;

    const MB: u64 = 1024 * 1024;

    struct Fixture {
        store: MemoryStore,
        slots: MemorySlots,
        policies: MediaPolicies,
    }

    impl Fixture {
        fn new() -> Self {
            let log = event_log();
            Self {
                store: MemoryStore::with_log(log.clone()),
                slots: MemorySlots::with_log(log),
                policies: MediaPolicies::with_limits(5 * MB, 5 * MB, 50 * MB, 5 * MB),
            }
        }

        fn manager(&self) -> MediaLifecycle<'_, MemoryStore, MemorySlots> {
            MediaLifecycle {
                store: &self.store,
                slots: &self.slots,
                policies: &self.policies,
            }
        }

        fn seed(&self, owner: SlotOwner, kind: SlotKind, path: &str) -> MediaSlot {
            self.store.insert(path, b"old".to_vec());
            let slot = MediaSlot::new(owner, kind, Some(path.to_string()));
            self.slots.insert(&slot);
            self.store.log().clear();
            slot
        }
    }

    fn png(size: usize) -> IncomingFile {
        IncomingFile::new(vec![7u8; size], "image/png", Some("face.png".into()))
    }

    #[tokio::test]
    async fn no_file_and_no_removal_is_a_noop() {
        let fx = Fixture::new();
        let slot = fx.seed(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar, "a/old.png");

        let out = fx.manager().apply_update(&slot, None, false).await.unwrap();

        assert_eq!(out.slot.current_path.as_deref(), Some("a/old.png"));
        assert_eq!(out.removed_path, None);
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn replacement_stores_new_file_then_deletes_old_once() {
        let fx = Fixture::new();
        let owner = Uuid::new_v4();
        let slot = fx.seed(SlotOwner::User(owner), SlotKind::Avatar, "profiles/avatars/old.png");
        let file = png(2048);

        let out = fx
            .manager()
            .apply_update(&slot, Some(&file), false)
            .await
            .unwrap();

        let new_path = out.slot.current_path.clone().unwrap();
        assert_ne!(new_path, "profiles/avatars/old.png");
        assert!(new_path.starts_with(&format!("profiles/avatars/{owner}-")));
        assert!(new_path.ends_with(".png"));
        assert_eq!(fx.store.object(&new_path), Some(file.bytes.clone()));
        assert_eq!(fx.store.object("profiles/avatars/old.png"), None);
        assert_eq!(fx.store.delete_count("profiles/avatars/old.png"), 1);
        assert_eq!(out.removed_path.as_deref(), Some("profiles/avatars/old.png"));
        assert_eq!(
            fx.slots.path_of(SlotOwner::User(owner), SlotKind::Avatar),
            Some(new_path)
        );
    }

    #[tokio::test]
    async fn record_is_persisted_before_old_file_is_deleted() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Header, "h/old.png");

        fx.manager()
            .apply_update(&slot, Some(&png(10)), false)
            .await
            .unwrap();

        let events = fx.store.log().events();
        let saved = events
            .iter()
            .position(|e| matches!(e, Event::Saved(..)))
            .unwrap();
        let deleted = events
            .iter()
            .position(|e| matches!(e, Event::Deleted(p) if p == "h/old.png"))
            .unwrap();
        let put = events
            .iter()
            .position(|e| matches!(e, Event::Put(_)))
            .unwrap();
        assert!(put < saved && saved < deleted, "{events:?}");
    }

    #[tokio::test]
    async fn removal_clears_slot_and_deletes_once() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Avatar, "a/current.png");

        let out = fx.manager().apply_update(&slot, None, true).await.unwrap();

        assert_eq!(out.slot.current_path, None);
        assert_eq!(fx.slots.path_of(owner, SlotKind::Avatar), None);
        assert_eq!(fx.store.delete_count("a/current.png"), 1);
        assert_eq!(out.removed_path.as_deref(), Some("a/current.png"));
    }

    #[tokio::test]
    async fn removal_wins_over_replacement() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Avatar, "a/current.png");

        let out = fx
            .manager()
            .apply_update(&slot, Some(&png(10)), true)
            .await
            .unwrap();

        assert_eq!(out.slot.current_path, None);
        assert_eq!(fx.store.put_count(), 0);
        assert_eq!(fx.store.len(), 0);
    }

    #[tokio::test]
    async fn removal_on_empty_slot_makes_no_calls() {
        let fx = Fixture::new();
        let slot = MediaSlot::empty(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar);

        let out = fx.manager().apply_update(&slot, None, true).await.unwrap();

        assert_eq!(out.slot.current_path, None);
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_side_effects() {
        let fx = Fixture::new();
        let owner = SlotOwner::Track(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Audio, "tracks/old.mp3");
        let big = IncomingFile::new(
            vec![0u8; (60 * MB) as usize],
            "audio/mpeg",
            Some("long.mp3".into()),
        );

        let err = fx
            .manager()
            .apply_update(&slot, Some(&big), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Validation(_)));
        assert_eq!(fx.slots.path_of(owner, SlotKind::Audio).as_deref(), Some("tracks/old.mp3"));
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn disallowed_type_is_rejected_without_side_effects() {
        let fx = Fixture::new();
        let slot = fx.seed(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar, "a/x.png");
        let exe = IncomingFile::new(vec![1; 10], "application/x-msdownload", None);

        let err = fx
            .manager()
            .apply_update(&slot, Some(&exe), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Validation(_)));
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_removes_fresh_upload_and_keeps_old() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Avatar, "a/keep.png");
        fx.slots.fail_saves(true);

        let err = fx
            .manager()
            .apply_update(&slot, Some(&png(10)), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Persistence(_)));
        assert_eq!(fx.store.object("a/keep.png"), Some(b"old".to_vec()));
        assert_eq!(fx.store.len(), 1);
        assert_eq!(fx.slots.path_of(owner, SlotKind::Avatar).as_deref(), Some("a/keep.png"));
    }

    #[tokio::test]
    async fn storage_failure_leaves_record_untouched() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Avatar, "a/keep.png");
        fx.store.fail_puts(true);

        let err = fx
            .manager()
            .apply_update(&slot, Some(&png(10)), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Storage(_)));
        assert_eq!(fx.slots.path_of(owner, SlotKind::Avatar).as_deref(), Some("a/keep.png"));
        assert_eq!(fx.slots.save_count(), 0);
    }

    #[tokio::test]
    async fn delete_failures_are_swallowed() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(owner, SlotKind::Avatar, "a/old.png");
        fx.store.fail_deletes(true);

        let out = fx
            .manager()
            .apply_update(&slot, Some(&png(10)), false)
            .await
            .unwrap();

        assert!(out.slot.current_path.is_some());
        assert_eq!(fx.slots.path_of(owner, SlotKind::Avatar), out.slot.current_path);
    }

    #[tokio::test]
    async fn shared_path_is_not_deleted() {
        let fx = Fixture::new();
        let a = SlotOwner::User(Uuid::new_v4());
        let b = SlotOwner::User(Uuid::new_v4());
        let slot = fx.seed(a, SlotKind::Avatar, "a/shared.png");
        fx.slots
            .insert(&MediaSlot::new(b, SlotKind::Avatar, Some("a/shared.png".into())));

        let out = fx.manager().apply_update(&slot, None, true).await.unwrap();

        assert_eq!(out.removed_path, None);
        assert_eq!(fx.store.delete_count("a/shared.png"), 0);
        assert!(fx.store.object("a/shared.png").is_some());
    }

    #[tokio::test]
    async fn missing_owner_rolls_back_upload() {
        let fx = Fixture::new();
        let slot = MediaSlot::empty(SlotOwner::Track(Uuid::new_v4()), SlotKind::Audio);
        let mp3 = IncomingFile::new(vec![1; 10], "audio/mpeg", Some("a.mp3".into()));

        let err = fx
            .manager()
            .apply_update(&slot, Some(&mp3), false)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::OwnerNotFound));
        assert_eq!(fx.store.len(), 0);
    }

    #[tokio::test]
    async fn delete_owner_removes_each_path_once() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        fx.seed(owner, SlotKind::Avatar, "a/1.png");
        fx.seed(owner, SlotKind::Header, "h/1.png");
        fx.store.log().clear();

        let n = fx.manager().delete_owner(owner).await.unwrap();

        assert_eq!(n, 2);
        assert_eq!(fx.store.delete_count("a/1.png"), 1);
        assert_eq!(fx.store.delete_count("h/1.png"), 1);
        assert_eq!(fx.store.len(), 0);
        let events = fx.store.log().events();
        assert!(matches!(events.first(), Some(Event::OwnerDeleted(_))), "{events:?}");
    }

    #[tokio::test]
    async fn delete_owner_skips_empty_slots() {
        let fx = Fixture::new();
        let owner = SlotOwner::User(Uuid::new_v4());
        fx.slots.insert(&MediaSlot::empty(owner, SlotKind::Avatar));
        fx.seed(owner, SlotKind::Header, "h/only.png");
        fx.store.log().clear();

        let n = fx.manager().delete_owner(owner).await.unwrap();

        assert_eq!(n, 1);
        assert_eq!(fx.store.delete_count("h/only.png"), 1);
    }

    #[tokio::test]
    async fn delete_unknown_owner_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .manager()
            .delete_owner(SlotOwner::Track(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::OwnerNotFound));
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn avatar_replacement_scenario() {
        let fx = Fixture::new();
        let owner = Uuid::new_v4();
        let slot = fx.seed(SlotOwner::User(owner), SlotKind::Avatar, "avatars/u1.png");
        let file = IncomingFile::new(b"...".to_vec(), "image/png", None);

        let out = fx
            .manager()
            .apply_update(&slot, Some(&file), false)
            .await
            .unwrap();

        let new_path = out.slot.current_path.unwrap();
        assert!(new_path.ends_with(".png"));
        assert_eq!(fx.store.object(&new_path), Some(b"...".to_vec()));
        assert_eq!(fx.store.object("avatars/u1.png"), None);
    }

    #[tokio::test]
    async fn stage_and_abandon_leave_store_as_before() {
        let fx = Fixture::new();
        let slot = fx.seed(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar, "a/old.png");
        let manager = fx.manager();

        let change = manager.stage(&slot, Some(&png(4)), false).await.unwrap();
        assert_eq!(fx.store.len(), 2);
        manager.abandon(&change).await;

        assert_eq!(fx.store.len(), 1);
        assert!(fx.store.object("a/old.png").is_some());
    }

    #[tokio::test]
    async fn commit_keeps_a_path_the_slot_still_holds() {
        let fx = Fixture::new();
        let slot = fx.seed(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar, "a/old.png");
        let change = SlotChange {
            slot: slot.with_path(Some("a/old.png".into())),
            released: Some("a/old.png".into()),
            stored: Some("a/old.png".into()),
        };

        assert_eq!(fx.manager().commit(&change).await, None);
        assert!(fx.store.object("a/old.png").is_some());
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn replacement_writes_once_under_a_fresh_path() {
        let fx = Fixture::new();
        let slot = fx.seed(SlotOwner::User(Uuid::new_v4()), SlotKind::Avatar, "a/old.png");

        let change = fx.manager().stage(&slot, Some(&png(4)), false).await.unwrap();

        assert_eq!(fx.store.put_count(), 1);
        assert_ne!(change.slot.current_path.as_deref(), Some("a/old.png"));
        assert_eq!(change.released.as_deref(), Some("a/old.png"));
    }
}
