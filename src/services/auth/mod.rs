/*
 * Responsibility
 * - Token issuance / validation (jwt), request identity carrier (context)
 * - Public-route classification (whitelist)
 * - Account flows that mint tokens (token_service)
 * - HTTP wiring lives in crate::middleware::auth, not here
 */
pub mod claims;
pub mod clock;
pub mod context;
pub mod error;
pub mod jwt;
pub mod password;
pub mod token_service;
pub mod whitelist;

pub use claims::{Claims, IdentityFields, Role, TokenKind, TokenPair};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AuthError;
pub use jwt::{SigningError, TokenCodec, TokenError, TokenTtl};
pub use token_service::TokenService;
pub use whitelist::{RouteId, Whitelist, WhitelistEntry};
