/*
 * Responsibility
 * - User の response DTO
 * - password_hash は決して外に出さない
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::Role;
use crate::services::users::User;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            phone_number: u.phone_number.clone(),
            role: u.role,
            active: u.active,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}
