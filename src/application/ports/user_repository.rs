use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::User;

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_listener: bool,
    pub is_creator: bool,
}

#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub bio: Option<String>,
    pub is_listener: bool,
    pub is_creator: bool,
    pub profile_picture: Option<String>,
    pub header_image: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, new_user: NewUser<'_>) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn password_hash(&self, id: Uuid) -> anyhow::Result<Option<String>>;
    /// Writes all profile fields in one statement. `bio: None` keeps the stored bio.
    async fn update_profile(&self, id: Uuid, fields: &ProfileFields) -> anyhow::Result<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
}
