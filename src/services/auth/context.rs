//! Request-scoped identity carrier.
//!
//! The carrier stores one validated `Claims` value in a request's
//! `http::Extensions`. It knows nothing about tokens or headers; the
//! middleware put claims in, handlers and the role guard read them out.
//!
//! The stored value is wrapped in a private type so that only `attach` can
//! place an identity on a request.

use axum::http::Extensions;
use thiserror::Error;

use super::claims::Claims;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no identity attached to this request")]
pub struct NoIdentity;

#[derive(Debug, Clone)]
struct RequestIdentity(Claims);

/// Attach `claims` to the request. A second call replaces the first.
pub fn attach(extensions: &mut Extensions, claims: Claims) {
    extensions.insert(RequestIdentity(claims));
}

pub fn read(extensions: &Extensions) -> Result<&Claims, NoIdentity> {
    extensions
        .get::<RequestIdentity>()
        .map(|identity| &identity.0)
        .ok_or(NoIdentity)
}

pub fn is_attached(extensions: &Extensions) -> bool {
    extensions.get::<RequestIdentity>().is_some()
}
