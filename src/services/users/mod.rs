/*
 * Responsibility
 * - Account lookup used by the auth endpoints (register / login / refresh)
 * - The auth core never calls this; it only sees IdentityFields
 * - Storage is a collaborator behind the `UserDirectory` trait
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::services::auth::{IdentityFields, Role};

mod memory;

pub use memory::InMemoryUserDirectory;

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: String,
    pub role: Role,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Snapshot stamped into tokens issued for this account.
    pub fn identity(&self) -> IdentityFields {
        IdentityFields {
            subject: self.id.clone(),
            email: self.email.clone(),
            display_name: self.full_name.clone(),
            phone: self.phone_number.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: String,
    pub role: Role,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserDirectoryError {
    #[error("user already exists")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, UserDirectoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserDirectoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserDirectoryError>;

    async fn list(&self) -> Result<Vec<User>, UserDirectoryError>;

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), UserDirectoryError>;

    /// `None` leaves a field unchanged.
    async fn update_profile(
        &self,
        id: &str,
        full_name: Option<String>,
        phone_number: Option<String>,
    ) -> Result<User, UserDirectoryError>;

    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: String,
    ) -> Result<(), UserDirectoryError>;
}
