use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::AccountError;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("valid regex"));

const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_username(username: &str) -> Result<(), AccountError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AccountError::Invalid(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), AccountError> {
    let trimmed = email.trim();
    let valid = trimmed
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if valid && !trimmed.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(AccountError::Invalid("Enter a valid email address.".into()))
    }
}

/// Rejects short, all-numeric, and username-like passwords.
pub fn validate_password(password: &str, username: Option<&str>) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::Invalid(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AccountError::Invalid(
            "This password is entirely numeric.".into(),
        ));
    }
    if let Some(name) = username {
        if !name.is_empty() && password.to_lowercase().contains(&name.to_lowercase()) {
            return Err(AccountError::Invalid(
                "The password is too similar to the username.".into(),
            ));
        }
    }
    Ok(())
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Random URL-safe token for password reset links.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Only the digest of a reset token is stored.
pub fn hash_reset_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
