//! Best-effort identity.
//!
//! Runs on every request. A valid access token attaches its claims; anything
//! else (no header, other scheme, bad or expired token) leaves the request
//! untouched. This layer never rejects.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::middleware::bearer_auth::bearer_token;
use crate::services::auth::{TokenKind, context};
use crate::state::AppState;

pub async fn optional_identity(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let outcome =
        bearer_token(req.headers()).map(|token| state.tokens.validate(token, TokenKind::Access));

    match outcome {
        Ok(Ok(claims)) => context::attach(req.extensions_mut(), claims),
        Ok(Err(err)) => debug!(error = %err, "optional identity: token ignored"),
        Err(_) => {}
    }

    next.run(req).await
}
