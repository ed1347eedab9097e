/*
 * Responsibility
 * - /auth 系 handler (register / login / refresh-token / profile / change-password / logout)
 * - Json を extractor で受け、TokenService に委譲する
 * - profile は token を再検証せず、middleware が載せた Claims だけを読む
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::v1::dto::auth::{
    AccessTokenResponse, AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse,
    ProfileResponse, RefreshTokenRequest, RegisterRequest, UpdateProfileRequest,
    UpdatedProfileResponse,
};
use crate::api::v1::dto::users::UserResponse;
use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let out = state.auth.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(out.tokens, UserResponse::from(&out.user))),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let out = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse::new(
        out.tokens,
        UserResponse::from(&out.user),
    )))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let access_token = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

pub async fn profile(Identity(claims): Identity) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&claims))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UpdatedProfileResponse>, AppError> {
    let user = state.auth.update_profile(&claims.subject, req.into()).await?;
    Ok(Json(UpdatedProfileResponse::from(&user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .auth
        .change_password(&claims.subject, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Identity(claims): Identity,
) -> Json<MessageResponse> {
    state.auth.logout(&claims.subject);
    Json(MessageResponse {
        message: "Logout successful",
    })
}
