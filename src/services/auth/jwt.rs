//! HS256 token codec: issue and validate typed session tokens.
//!
//! The codec owns the shared secret and is built once at startup; it is then
//! shared read-only (behind `Arc`) by every request task. Validation is a pure
//! CPU-bound check and touches no shared mutable state.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;
use tracing::error;

use super::claims::{Claims, IdentityFields, TokenKind, TokenPair};
use super::clock::{Clock, SystemClock};

pub const DEFAULT_ISSUER: &str = "jobbly-auth-service";

/// 24 hours.
pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 24 * 60 * 60;
/// 7 days.
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Why a presented token was rejected.
///
/// The variants are for logs and for the enforcement layer's mapping; clients
/// only ever see the coarse outcome (expired vs invalid).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not yet valid")]
    NotYetValid,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
}

/// Issuance failures. These are server-side faults, never client errors.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("token subject must not be empty")]
    EmptySubject,
    #[error("token lifetime of {0} seconds is out of range")]
    TtlOutOfRange(u64),
    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub access_seconds: u64,
    pub refresh_seconds: u64,
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    ttl: TokenTtl,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec for `secret`. An empty secret is refused.
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: TokenTtl) -> Result<Self, SigningError> {
        if secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        let issuer = issuer.into();

        // Only HS256 is accepted; a header naming any other algorithm is
        // rejected by jsonwebtoken before the signature is checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);
        validation.validate_aud = false;
        // exp/nbf are checked below against the injected clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            issuer,
            ttl,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sign a token of `kind` for `fields`, valid for `ttl_seconds` from now.
    pub fn issue(
        &self,
        fields: &IdentityFields,
        kind: TokenKind,
        ttl_seconds: u64,
    ) -> Result<String, SigningError> {
        self.issue_at(fields, kind, ttl_seconds, self.clock.now())
    }

    /// Access token with the configured access lifetime.
    pub fn issue_access(&self, fields: &IdentityFields) -> Result<String, SigningError> {
        self.issue(fields, TokenKind::Access, self.ttl.access_seconds)
    }

    /// Access + refresh token sharing one `issued_at`.
    pub fn new_token_pair(&self, fields: &IdentityFields) -> Result<TokenPair, SigningError> {
        let now = self.clock.now();
        let access_token =
            self.issue_at(fields, TokenKind::Access, self.ttl.access_seconds, now)?;
        let refresh_token =
            self.issue_at(fields, TokenKind::Refresh, self.ttl.refresh_seconds, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn issue_at(
        &self,
        fields: &IdentityFields,
        kind: TokenKind,
        ttl_seconds: u64,
        now: i64,
    ) -> Result<String, SigningError> {
        if fields.subject.trim().is_empty() {
            return Err(SigningError::EmptySubject);
        }
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(SigningError::TtlOutOfRange(ttl_seconds))?;

        let claims = Claims {
            subject: fields.subject.clone(),
            email: fields.email.clone(),
            display_name: fields.display_name.clone(),
            phone: fields.phone.clone(),
            role: fields.role,
            token_kind: kind,
            issuer: self.issuer.clone(),
            issued_at: now,
            not_before: now,
            expires_at,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, kind = %kind, "failed to sign token");
            SigningError::Encode(e)
        })
    }

    /// Verify signature, issuer, lifetime and kind, in that order.
    ///
    /// A token is expired from the second `now` reaches `expires_at`.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?
            .claims;

        if claims.subject.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        let now = self.clock.now();
        if now >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        if now < claims.not_before {
            return Err(TokenError::NotYetValid);
        }

        if claims.token_kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.token_kind,
            });
        }

        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        _ => TokenError::Malformed,
    }
}
