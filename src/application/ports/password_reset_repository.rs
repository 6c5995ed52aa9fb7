use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ResetTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<Uuid>;
    async fn find_by_hash(&self, token_hash: &str) -> anyhow::Result<Option<ResetTokenRow>>;
    /// Marks the token used and rotates the user's password in one transaction.
    async fn consume(&self, token_id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
}
