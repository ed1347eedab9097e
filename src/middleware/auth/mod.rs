/*
 * Responsibility
 * - 認証 pipeline の配線: optional → whitelist 判定 → access (enforcement) → role guard
 * - optional は常に最初に走り、決して拒否しない
 * - access は public route では何もしない
 */
use axum::Router;
use axum::middleware;

use crate::state::AppState;

pub mod access;
pub mod optional;
pub mod role;

pub use role::{RoleGuard, require_roles};

/// Apply the optional-identity and enforcement layers to `router`.
///
/// The later `.layer` call wraps the earlier one, so the optional layer sees
/// every request before enforcement does.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::access_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            optional::optional_identity,
        ))
}
