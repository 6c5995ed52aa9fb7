use crate::application::ports::user_repository::{NewUser, UserRepository};
use crate::domain::users::user::User;

use super::AccountError;
use super::credentials::{hash_password, validate_email, validate_password, validate_username};

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_listener: bool,
    pub is_creator: bool,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<User, AccountError> {
        let username = req.username.trim();
        validate_username(username)?;
        validate_email(&req.email)?;
        validate_password(&req.password, Some(username))?;

        if self.repo.find_by_username(username).await?.is_some() {
            return Err(AccountError::UsernameTaken);
        }
        let email = req.email.trim();
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }
        let hash = hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                username,
                email,
                password_hash: &hash,
                is_listener: req.is_listener,
                is_creator: req.is_creator,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = user.role().as_str(), "user_registered");
        Ok(user)
    }
}
