//! access token 検証 → Claims を extensions に入れる
//!
//! - whitelist にマッチする route は素通り
//! - optional layer が Claims を載せ済みなら header は読み直さない
//! - それ以外は Bearer token を Access として検証し、失敗時は 401

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::middleware::bearer_auth::bearer_token;
use crate::services::auth::{AuthError, Claims, RouteId, TokenCodec, TokenKind, context};
use crate::state::AppState;

pub async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let public = {
        let operation = req.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
        state.whitelist.classify(
            req.method(),
            RouteId {
                path: Some(req.uri().path()),
                operation,
            },
        )
    };
    if public || context::is_attached(req.extensions()) {
        return Ok(next.run(req).await);
    }

    let claims = match authenticate(&state.tokens, req.headers()) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                code = err.code(),
                "access denied"
            );
            return Err(err.into());
        }
    };

    context::attach(req.extensions_mut(), claims);

    Ok(next.run(req).await)
}

/// Header → validated access claims.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    codec.validate(token, TokenKind::Access).map_err(|err| {
        // the client only ever sees the coarse code
        warn!(error = %err, "access token rejected");
        AuthError::from(err)
    })
}
