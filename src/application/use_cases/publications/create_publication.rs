use uuid::Uuid;

use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::publication_repository::{NewPublication, PublicationRepository};
use crate::application::services::media::{MediaError, MediaLifecycle};
use crate::application::use_cases::tracks::validate_title;
use crate::domain::media::{IncomingFile, MediaPolicies, MediaSlot, SlotKind, SlotOwner};
use crate::domain::publications::publication::Publication;

#[derive(Debug, Clone)]
pub struct PublicationDraft {
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub project_id: Option<Uuid>,
    pub audio_file: Option<IncomingFile>,
    pub cover_image: Option<IncomingFile>,
}

pub struct CreatePublication<'a, P, S, R>
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

impl<'a, P, S, R> CreatePublication<'a, P, S, R>
where
    P: PublicationRepository + ?Sized,
    S: ObjectStore + ?Sized,
    R: MediaSlotRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        draft: PublicationDraft,
    ) -> Result<Publication, MediaError> {
        let title = validate_title(&draft.title)?;
        let audio = draft
            .audio_file
            .ok_or_else(|| MediaError::Validation("No audio file was submitted.".into()))?;
        let media = MediaLifecycle {
            store: self.store,
            slots: self.slots,
            policies: self.policies,
        };
        media.validate(SlotKind::Audio, &audio)?;
        if let Some(cover) = &draft.cover_image {
            media.validate(SlotKind::Cover, cover)?;
        }
        if let Some(project_id) = draft.project_id {
            let owned = self
                .publications
                .project_belongs_to(project_id, user_id)
                .await
                .map_err(MediaError::Persistence)?;
            if !owned {
                return Err(MediaError::Validation(format!(
                    "Invalid project \"{project_id}\" - object does not exist."
                )));
            }
        }

        let id = Uuid::new_v4();
        let owner = SlotOwner::Publication(id);
        let audio_change = media
            .stage(&MediaSlot::empty(owner, SlotKind::Audio), Some(&audio), false)
            .await?;
        let cover_change = match media
            .stage(
                &MediaSlot::empty(owner, SlotKind::Cover),
                draft.cover_image.as_ref(),
                false,
            )
            .await
        {
            Ok(change) => change,
            Err(err) => {
                media.abandon(&audio_change).await;
                return Err(err);
            }
        };
        let Some(audio_path) = audio_change.slot.current_path.as_deref() else {
            return Err(MediaError::Validation("No audio file was submitted.".into()));
        };

        let inserted = self
            .publications
            .insert(NewPublication {
                id,
                user_id,
                project_id: draft.project_id,
                title: &title,
                description: draft.description.trim(),
                audio_file: audio_path,
                cover_image: cover_change.slot.current_path.as_deref(),
                is_public: draft.is_public,
            })
            .await;
        match inserted {
            Ok(publication) => {
                tracing::info!(publication_id = %id, user_id = %user_id, "publication_created");
                Ok(publication)
            }
            Err(err) => {
                tracing::error!(user_id = %user_id, error = ?err, "publication_insert_failed");
                media.abandon(&audio_change).await;
                media.abandon(&cover_change).await;
                Err(MediaError::Persistence(err))
            }
        }
    }
}
