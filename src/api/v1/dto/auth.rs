/*
 * Responsibility
 * - /auth 系の request/response DTO
 * - 空白除去だけをここで行い、email の正規化や業務ルールは TokenService 側
 */
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::users::UserResponse;
use crate::services::auth::token_service::{ProfileUpdate, Registration};
use crate::services::auth::{Claims, Role, TokenPair};
use crate::services::users::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            full_name: req.full_name.trim().to_string(),
            email: req.email,
            password: req.password,
            phone_number: req.phone_number.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            full_name: req.full_name,
            phone_number: req.phone_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(tokens: TokenPair, user: UserResponse) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Profile as stamped into the access token at issuance.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub role: Role,
}

impl From<&Claims> for ProfileResponse {
    fn from(c: &Claims) -> Self {
        Self {
            id: c.subject.clone(),
            email: c.email.clone(),
            full_name: c.display_name.clone(),
            phone_number: c.phone.clone(),
            role: c.role,
        }
    }
}

/// Stored profile after an update. It is not what current tokens carry.
#[derive(Debug, Serialize)]
pub struct UpdatedProfileResponse {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
}

impl From<&User> for UpdatedProfileResponse {
    fn from(u: &User) -> Self {
        Self {
            full_name: u.full_name.clone(),
            email: u.email.clone(),
            phone_number: u.phone_number.clone(),
            role: u.role,
        }
    }
}
