use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::email_sender::EmailSender;
use crate::application::ports::media_slot_repository::MediaSlotRepository;
use crate::application::ports::object_store::ObjectStore;
use crate::application::ports::password_reset_repository::PasswordResetRepository;
use crate::application::ports::project_repository::ProjectRepository;
use crate::application::ports::publication_repository::PublicationRepository;
use crate::application::ports::track_repository::TrackRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::{Config, StorageBackend};
use crate::domain::media::MediaPolicies;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::media_slot_repository_sqlx::SqlxMediaSlotRepository;
use crate::infrastructure::db::repositories::password_reset_repository_sqlx::SqlxPasswordResetRepository;
use crate::infrastructure::db::repositories::project_repository_sqlx::SqlxProjectRepository;
use crate::infrastructure::db::repositories::publication_repository_sqlx::SqlxPublicationRepository;
use crate::infrastructure::db::repositories::track_repository_sqlx::SqlxTrackRepository;
use crate::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use crate::infrastructure::email::LettreEmailSender;
use crate::infrastructure::storage::{FsObjectStore, S3ObjectStore, TimeoutObjectStore};

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    media_slots: Arc<dyn MediaSlotRepository>,
    track_repo: Arc<dyn TrackRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    publication_repo: Arc<dyn PublicationRepository>,
    password_resets: Arc<dyn PasswordResetRepository>,
    object_store: Arc<dyn ObjectStore>,
    email_sender: Arc<dyn EmailSender>,
    media_policies: MediaPolicies,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        media_slots: Arc<dyn MediaSlotRepository>,
        track_repo: Arc<dyn TrackRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        publication_repo: Arc<dyn PublicationRepository>,
        password_resets: Arc<dyn PasswordResetRepository>,
        object_store: Arc<dyn ObjectStore>,
        email_sender: Arc<dyn EmailSender>,
        media_policies: MediaPolicies,
    ) -> Self {
        Self {
            user_repo,
            media_slots,
            track_repo,
            project_repo,
            publication_repo,
            password_resets,
            object_store,
            email_sender,
            media_policies,
        }
    }

    /// Wires the Postgres repositories, the configured object store and the
    /// mailer.
    pub async fn from_config(cfg: &Config, pool: PgPool) -> anyhow::Result<Self> {
        let limit = Duration::from_secs(cfg.storage_timeout_secs.max(1));
        let object_store: Arc<dyn ObjectStore> = match cfg.storage_backend {
            StorageBackend::Filesystem => {
                tokio::fs::create_dir_all(&cfg.storage_root).await?;
                Arc::new(TimeoutObjectStore::new(
                    FsObjectStore::new(&cfg.storage_root),
                    limit,
                ))
            }
            StorageBackend::S3 => Arc::new(TimeoutObjectStore::new(
                S3ObjectStore::new(cfg).await?,
                limit,
            )),
        };

        Ok(Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxMediaSlotRepository::new(pool.clone())),
            Arc::new(SqlxTrackRepository::new(pool.clone())),
            Arc::new(SqlxProjectRepository::new(pool.clone())),
            Arc::new(SqlxPublicationRepository::new(pool.clone())),
            Arc::new(SqlxPasswordResetRepository::new(pool)),
            object_store,
            Arc::new(LettreEmailSender::new(cfg)?),
            cfg.media_policies(),
        ))
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn media_slots(&self) -> Arc<dyn MediaSlotRepository> {
        self.services.media_slots.clone()
    }

    pub fn track_repo(&self) -> Arc<dyn TrackRepository> {
        self.services.track_repo.clone()
    }

    pub fn project_repo(&self) -> Arc<dyn ProjectRepository> {
        self.services.project_repo.clone()
    }

    pub fn publication_repo(&self) -> Arc<dyn PublicationRepository> {
        self.services.publication_repo.clone()
    }

    pub fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        self.services.password_resets.clone()
    }

    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.services.object_store.clone()
    }

    pub fn email_sender(&self) -> Arc<dyn EmailSender> {
        self.services.email_sender.clone()
    }

    pub fn media_policies(&self) -> &MediaPolicies {
        &self.services.media_policies
    }
}
