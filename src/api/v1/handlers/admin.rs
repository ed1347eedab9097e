/*
 * Responsibility
 * - /admin 系 handler (ADMIN role は routes.rs の role guard で保証済み)
 */
use axum::{Json, extract::State};
use tracing::debug;

use crate::api::v1::dto::users::UserResponse;
use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    caller: Identity,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list().await?;
    debug!(admin = %caller.subject, count = users.len(), "listing users");

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
