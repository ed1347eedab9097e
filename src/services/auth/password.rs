use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is too weak: {0}")]
    Weak(String),
    #[error("failed to hash password")]
    Hash,
    #[error("stored password hash is invalid")]
    InvalidHash,
}

/// Caller-supplied password acceptance rule.
pub trait PasswordPolicy: Send + Sync {
    fn check(&self, password: &str) -> Result<(), PasswordError>;
}

/// At least `.0` characters; 8 by default.
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Default for MinLength {
    fn default() -> Self {
        MinLength(8)
    }
}

impl PasswordPolicy for MinLength {
    fn check(&self, password: &str) -> Result<(), PasswordError> {
        if password.chars().count() < self.0 {
            return Err(PasswordError::Weak(format!(
                "must be at least {} characters",
                self.0
            )));
        }
        Ok(())
    }
}

/// Hash a password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
