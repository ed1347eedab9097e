use thiserror::Error;

use super::jwt::TokenError;

/// Outcome of a rejected enforcement or role check.
///
/// `code()` is the stable wire code; the message never says which token
/// check failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authentication token")]
    MissingToken,
    #[error("invalid authorization header format")]
    InvalidHeader,
    #[error("token has expired")]
    TokenExpired,
    #[error("token validation failed")]
    TokenInvalid,
    #[error("authentication required")]
    NoIdentity,
    #[error("insufficient permissions for this resource")]
    InsufficientPermission,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "AUTH_MISSING_TOKEN",
            AuthError::InvalidHeader => "AUTH_INVALID_HEADER",
            AuthError::TokenExpired => "AUTH_TOKEN_EXPIRED",
            AuthError::TokenInvalid => "AUTH_TOKEN_INVALID",
            AuthError::NoIdentity => "AUTH_UNAUTHORIZED",
            AuthError::InsufficientPermission => "AUTH_INSUFFICIENT_PERMISSION",
        }
    }

    /// 403 rather than 401.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::InsufficientPermission)
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}
