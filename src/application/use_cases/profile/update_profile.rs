use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::user_repository::{ProfileFields, UserRepository};
use crate::application::services::media::{MediaError, MediaLifecycle, SlotChange};
use crate::domain::media::{IncomingFile, MediaPolicies, MediaSlot, SlotKind, SlotOwner};
use crate::domain::users::user::User;

/// PATCH semantics of the profile form. Role flags are always written;
/// a field left out of the form arrives here as `false`.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub is_listener: bool,
    pub is_creator: bool,
    pub profile_picture: Option<IncomingFile>,
    pub header_image: Option<IncomingFile>,
    pub remove_profile_picture: bool,
    pub remove_header_image: bool,
}

pub struct UpdateProfile<'a, U, S, R>
where
    U: UserRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub users: &'a U,
    pub store: &'a S,
    pub slots: &'a R,
    pub policies: &'a MediaPolicies,
}

impl<'a, U, S, R> UpdateProfile<'a, U, S, R>
where
    U: UserRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User, MediaError> {
        let media = MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        };
        // Reject the whole form before anything is uploaded.
        if let Some(file) = &update.profile_picture {
            media.validate(SlotKind::Avatar, file)?;
        }
        if let Some(file) = &update.header_image {
            media.validate(SlotKind::Header, file)?;
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(MediaError::Persistence)?
            .ok_or(MediaError::OwnerNotFound)?;
        let owner = SlotOwner::User(user_id);
        let avatar_slot = MediaSlot::new(owner, SlotKind::Avatar, user.profile_picture.clone());
        let header_slot = MediaSlot::new(owner, SlotKind::Header, user.header_image.clone());

        let avatar = media
            .stage(
                &avatar_slot,
                update.profile_picture.as_ref(),
                update.remove_profile_picture,
            )
            .await?;
        let header = match media
            .stage(
                &header_slot,
                update.header_image.as_ref(),
                update.remove_header_image,
            )
            .await
        {
            Ok(change) => change,
            Err(err) => {
                media.abandon(&avatar).await;
                return Err(err);
            }
        };

        let fields = ProfileFields {
            bio: update.bio,
            is_listener: update.is_listener,
            is_creator: update.is_creator,
            profile_picture: avatar.slot.current_path.clone(),
            header_image: header.slot.current_path.clone(),
        };
        let saved = match self.users.update_profile(user_id, &fields).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                rollback(&media, [&avatar, &header]).await;
                return Err(MediaError::OwnerNotFound);
            }
            Err(err) => {
                tracing::error!(user_id = %user_id, error = ?err, "profile_update_failed");
                rollback(&media, [&avatar, &header]).await;
                return Err(MediaError::Persistence(err));
            }
        };

        for change in [&avatar, &header] {
            if let Some(path) = media.commit(change).await {
                tracing::debug!(user_id = %user_id, slot = %change.slot.kind, path = %path, "profile_media_released");
            }
        }
        Ok(saved)
    }
}

async fn rollback<S, R>(media: &MediaLifecycle<'_, S, R>, changes: [&SlotChange; 2])
where
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    for change in changes {
        media.abandon(change).await;
    }
}
