/*
 * Responsibility
 * - v1 の URL 構造を定義 (/api/v1 配下)
 * - /auth: register, login, refresh-token (public), profile / change-password / logout (要認証)
 * - /admin: ADMIN role のみ (role guard を route_layer で適用)
 * - 認証そのものは app.rs で Router 全体に掛ける
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    admin::list_users,
    auth::{change_password, login, logout, profile, refresh_token, register, update_profile},
};
use crate::middleware::auth::require_roles;
use crate::services::auth::Role;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let auth = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/profile", get(profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/logout", post(logout));

    let admin = require_roles(Router::new().route("/users", get(list_users)), &[Role::Admin]);

    Router::new().nest("/auth", auth).nest("/admin", admin)
}
