use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;

use crate::application::ports::email_sender::EmailSender;
use crate::application::ports::password_reset_repository::PasswordResetRepository;
use crate::application::ports::user_repository::UserRepository;

use super::credentials::{generate_reset_token, hash_reset_token};

pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

pub struct ForgotPassword<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordResetRepository + ?Sized,
{
    pub users: &'a U,
    pub resets: &'a P,
    pub mailer: Arc<dyn EmailSender>,
    /// Frontend page receiving `?token=`.
    pub reset_url: &'a str,
}

impl<'a, U, P> ForgotPassword<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordResetRepository + ?Sized,
{
    /// Issues a reset token and mails it in the background. Unknown emails
    /// succeed silently so the endpoint does not reveal which accounts exist.
    /// Repository failures are logged and swallowed for the same reason.
    /// Returns the mail task when one was spawned.
    pub async fn execute(&self, email: &str) -> anyhow::Result<Option<JoinHandle<()>>> {
        let user = match self.users.find_by_email(email.trim()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!("password_reset_unknown_email");
                return Ok(None);
            }
            Err(err) => {
                tracing::error!(error = ?err, "password_reset_lookup_failed");
                return Ok(None);
            }
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        if let Err(err) = self
            .resets
            .create_token(user.id, &hash_reset_token(&token), expires_at)
            .await
        {
            tracing::error!(user_id = %user.id, error = ?err, "password_reset_token_store_failed");
            return Ok(None);
        }

        let link = format!(
            "{}?token={}",
            self.reset_url.trim_end_matches('/'),
            urlencoding::encode(&token)
        );
        let mailer = self.mailer.clone();
        let to_email = user.email.clone();
        let to_name = user.username.clone();
        let user_id = user.id;
        let handle = tokio::spawn(async move {
            if let Err(err) = mailer
                .send_password_reset(&to_email, Some(&to_name), &link)
                .await
            {
                tracing::warn!(user_id = %user_id, error = ?err, "password_reset_email_failed");
            }
        });
        Ok(Some(handle))
    }
}
