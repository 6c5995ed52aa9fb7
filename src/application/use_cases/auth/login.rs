use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::User;

use super::credentials::verify_password;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<User>> {
        let user = match self.repo.find_by_username(req.username.trim()).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        let hash = self.repo.password_hash(user.id).await?.unwrap_or_default();
        if hash.is_empty() {
            return Ok(None);
        }
        if verify_password(&req.password, &hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}
