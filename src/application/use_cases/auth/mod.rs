pub mod credentials;
pub mod delete_account;
pub mod forgot_password;
pub mod login;
pub mod me;
pub mod register;
pub mod reset_password;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),
    #[error("a user with that username already exists")]
    UsernameTaken,
    #[error("a user with that email already exists")]
    EmailTaken,
    #[error("reset token is invalid or expired")]
    InvalidToken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
