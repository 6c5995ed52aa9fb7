use chrono::Utc;

use crate::application::ports::password_reset_repository::PasswordResetRepository;
use crate::application::ports::user_repository::UserRepository;

use super::AccountError;
use super::credentials::{hash_password, hash_reset_token, validate_password};

pub struct ResetPassword<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordResetRepository + ?Sized,
{
    pub users: &'a U,
    pub resets: &'a P,
}

impl<'a, U, P> ResetPassword<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordResetRepository + ?Sized,
{
    pub async fn execute(&self, token: &str, new_password: &str) -> Result<(), AccountError> {
        let row = self
            .resets
            .find_by_hash(&hash_reset_token(token.trim()))
            .await?
            .ok_or(AccountError::InvalidToken)?;
        if row.used_at.is_some() || row.expires_at <= Utc::now() {
            return Err(AccountError::InvalidToken);
        }
        let user = self
            .users
            .find_by_id(row.user_id)
            .await?
            .ok_or(AccountError::InvalidToken)?;
        validate_password(new_password, Some(&user.username))?;

        let hash = hash_password(new_password)?;
        if !self.resets.consume(row.id, &hash).await? {
            return Err(AccountError::InvalidToken);
        }
        tracing::info!(user_id = %user.id, "password_reset_completed");
        Ok(())
    }
}
