//! Role guard for routes that need more than "some identity".
//!
//! Mounted with `route_layer` so it runs after enforcement has attached
//! claims.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Extensions, Request},
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::{AuthError, Role, context};

#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<[Role]>,
}

impl RoleGuard {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    /// No identity: `NoIdentity` (401). Role outside the set: `InsufficientPermission` (403).
    pub fn check(&self, extensions: &Extensions) -> Result<(), AuthError> {
        let claims = context::read(extensions).map_err(|_| AuthError::NoIdentity)?;
        if claims.has_role(&self.allowed) {
            Ok(())
        } else {
            warn!(
                subject = %claims.subject,
                role = %claims.role,
                "role not permitted"
            );
            Err(AuthError::InsufficientPermission)
        }
    }
}

/// Guard every route currently in `router` with `allowed`.
pub fn require_roles<S>(router: Router<S>, allowed: &[Role]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(
        RoleGuard::new(allowed),
        role_middleware,
    ))
}

async fn role_middleware(
    State(guard): State<RoleGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard.check(req.extensions())?;
    Ok(next.run(req).await)
}
