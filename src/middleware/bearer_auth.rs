/*
 * Responsibility
 * - Authorization ヘッダから Bearer トークンを取り出す
 * - prefix は "Bearer " 固定 (case-sensitive)
 * - 検証そのものは services::auth::jwt の責務
 */
use axum::http::{HeaderMap, header};

use crate::services::auth::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the raw token.
///
/// - no header: `MissingToken`
/// - not UTF-8, wrong prefix, or nothing after the prefix: `InvalidHeader`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidHeader)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidHeader),
    }
}
