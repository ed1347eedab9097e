//! Token payload types.
//!
//! Responsibility:
//! - `Claims`: what a signed token carries once it has been validated
//! - `IdentityFields`: the identity snapshot handed to the codec at issuance
//! - `Role` / `TokenKind`: closed enums with fixed wire values

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorization role carried in every token.
///
/// Wire values are `"ADMIN"` and `"USER"`; comparison is exact, no case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminates what a token authorizes.
///
/// An access token authorizes ordinary API calls; a refresh token only the
/// exchange for a new access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Identity snapshot stamped into a token at issuance.
///
/// The profile fields are denormalized: they reflect the account at issuance
/// time and are never re-fetched while the token is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFields {
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub phone: String,
    pub role: Role,
}

/// Decoded and verified token payload.
///
/// Registered claim names (`sub`, `iss`, `iat`, `nbf`, `exp`) are used on the
/// wire; timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject: String,
    pub email: String,
    #[serde(rename = "full_name")]
    pub display_name: String,
    #[serde(rename = "phone_number")]
    pub phone: String,
    pub role: Role,
    #[serde(rename = "token_type")]
    pub token_kind: TokenKind,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "nbf")]
    pub not_before: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// The identity part of the claims, without kind or timestamps.
    pub fn identity(&self) -> IdentityFields {
        IdentityFields {
            subject: self.subject.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            phone: self.phone.clone(),
            role: self.role,
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

/// An access/refresh pair minted together for one identity.
///
/// Bearer-only: nothing about the pair is stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_values_are_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""ADMIN""#);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""USER""#);
    }

    #[test]
    fn role_wire_values_are_case_sensitive() {
        assert_eq!(serde_json::from_str::<Role>(r#""ADMIN""#).unwrap(), Role::Admin);
        assert_eq!(serde_json::from_str::<Role>(r#""USER""#).unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>(r#""admin""#).is_err());
        assert!(serde_json::from_str::<Role>(r#""User""#).is_err());
    }

    #[test]
    fn claims_use_registered_names_on_the_wire() {
        let claims = Claims {
            subject: "u-1".into(),
            email: "a@example.com".into(),
            display_name: "A".into(),
            phone: "0900".into(),
            role: Role::User,
            token_kind: TokenKind::Refresh,
            issuer: "jobbly-auth-service".into(),
            issued_at: 10,
            not_before: 10,
            expires_at: 20,
        };

        let v = serde_json::to_value(&claims).unwrap();
        assert_eq!(v["sub"], "u-1");
        assert_eq!(v["full_name"], "A");
        assert_eq!(v["token_type"], "refresh");
        assert_eq!(v["role"], "USER");
        assert_eq!(v["exp"], 20);
    }

    #[test]
    fn has_role_checks_membership() {
        let mut claims = Claims {
            subject: "u-1".into(),
            email: String::new(),
            display_name: String::new(),
            phone: String::new(),
            role: Role::User,
            token_kind: TokenKind::Access,
            issuer: String::new(),
            issued_at: 0,
            not_before: 0,
            expires_at: 1,
        };
        assert!(!claims.has_role(&[Role::Admin]));
        assert!(claims.has_role(&[Role::Admin, Role::User]));

        claims.role = Role::Admin;
        assert!(claims.has_role(&[Role::Admin]));
        assert!(!claims.has_role(&[]));
    }
}
