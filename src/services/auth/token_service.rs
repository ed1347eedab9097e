use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::services::auth::claims::{Role, TokenKind, TokenPair};
use crate::services::auth::error::AuthError;
use crate::services::auth::jwt::TokenCodec;
use crate::services::auth::password::{self, PasswordPolicy};
use crate::services::users::{NewUser, User, UserDirectory, UserDirectoryError};

/// Orchestrates the account flows that mint tokens.
///
/// - TokenCodec signs and validates tokens.
/// - UserDirectory resolves accounts; it is a collaborator, not part of the auth core.
/// - PasswordPolicy is supplied by the caller at assembly time.
#[derive(Clone)]
pub struct TokenService {
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserDirectory>,
    password_policy: Arc<dyn PasswordPolicy>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("codec", &self.codec)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
}

/// Fields left as `None` (or empty) are not changed.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Service-level return type to keep handlers thin.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub tokens: TokenPair,
    pub user: User,
}

impl TokenService {
    pub fn new(
        codec: Arc<TokenCodec>,
        users: Arc<dyn UserDirectory>,
        password_policy: Arc<dyn PasswordPolicy>,
    ) -> Self {
        Self {
            codec,
            users,
            password_policy,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create a USER account and issue its first token pair.
    pub async fn register(&self, mut req: Registration) -> Result<Authenticated, AppError> {
        req.email = normalize_email(&req.email);
        if req.email.is_empty() || req.password.is_empty() || req.full_name.trim().is_empty()
        {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "email, password and full_name are required",
            ));
        }
        if !is_plausible_email(&req.email) {
            return Err(AppError::bad_request(
                "INVALID_EMAIL_FORMAT",
                "invalid email format",
            ));
        }
        self.password_policy.check(&req.password)?;

        let user = self
            .create_user(req.full_name, req.email, req.password, req.phone_number, Role::User)
            .await?;
        info!(user_id = %user.id, "user registered");

        let tokens = self.codec.new_token_pair(&user.identity())?;
        Ok(Authenticated { tokens, user })
    }

    /// Check credentials and issue a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "email and password are required",
            ));
        }

        let invalid = || AppError::unauthorized("INVALID_CREDENTIALS", "invalid email or password");

        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !user.active {
            return Err(AppError::unauthorized("USER_INACTIVE", "user account is inactive"));
        }

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "password mismatch");
            return Err(invalid());
        }

        if let Err(e) = self.users.touch_last_login(&user.id, Utc::now()).await {
            warn!(user_id = %user.id, error = %e, "failed to record last login");
        }

        let tokens = self.codec.new_token_pair(&user.identity())?;
        Ok(Authenticated { tokens, user })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The account is looked up again so the new token carries a fresh profile
    /// snapshot; the refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "refresh_token is required",
            ));
        }

        let claims = self
            .codec
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                warn!(error = %e, "refresh token rejected");
                AppError::from(AuthError::from(e))
            })?;

        let user = self
            .users
            .find_by_id(&claims.subject)
            .await?
            .ok_or_else(user_not_found)?;
        if !user.active {
            return Err(AppError::unauthorized("USER_INACTIVE", "user account is inactive"));
        }

        Ok(self.codec.issue_access(&user.identity())?)
    }

    /// Create (or return the existing) ADMIN account. Used at startup.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            return Ok(existing);
        }
        let user = self
            .create_user(
                "Administrator".to_string(),
                email,
                password.to_string(),
                String::new(),
                Role::Admin,
            )
            .await?;
        info!(user_id = %user.id, "admin account seeded");
        Ok(user)
    }

    /// Update the caller's stored profile.
    ///
    /// Tokens already issued keep their old snapshot until the next login or
    /// refresh.
    pub async fn update_profile(
        &self,
        subject: &str,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        let full_name = non_blank(update.full_name);
        let phone_number = non_blank(update.phone_number);
        if full_name.is_none() && phone_number.is_none() {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "at least one field (full_name or phone_number) must be provided",
            ));
        }

        let user = self
            .users
            .update_profile(subject, full_name, phone_number)
            .await
            .map_err(|e| match e {
                UserDirectoryError::NotFound => user_not_found(),
                other => other.into(),
            })?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        subject: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "old_password and new_password are required",
            ));
        }
        if old_password == new_password {
            return Err(AppError::bad_request(
                "DATA_REQUEST_INVALID",
                "new password must be different from old password",
            ));
        }
        self.password_policy.check(new_password)?;

        let user = self
            .users
            .find_by_id(subject)
            .await?
            .ok_or_else(user_not_found)?;
        if !verify_blocking(old_password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::unauthorized(
                "INVALID_CREDENTIALS",
                "old password is incorrect",
            ));
        }

        let new_password = new_password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || password::hash_password(&new_password))
                .await
                .map_err(|_| AppError::Internal)??;
        self.users
            .update_password_hash(&user.id, password_hash)
            .await
            .map_err(|e| match e {
                UserDirectoryError::NotFound => user_not_found(),
                other => other.into(),
            })?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    /// Tokens are bearer-only and not revoked; this only records the event.
    pub fn logout(&self, subject: &str) {
        info!(user_id = %subject, "user logged out");
    }

    async fn create_user(
        &self,
        full_name: String,
        email: String,
        password: String,
        phone_number: String,
        role: Role,
    ) -> Result<User, AppError> {
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|_| AppError::Internal)??;

        Ok(self
            .users
            .create(NewUser {
                full_name,
                email,
                password_hash,
                phone_number,
                role,
            })
            .await?)
    }
}

async fn verify_blocking(candidate: String, hash: String) -> Result<bool, AppError> {
    Ok(
        tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
            .await
            .map_err(|_| AppError::Internal)??,
    )
}

/// The subject of a still-valid token no longer exists; the client must log in again.
fn user_not_found() -> AppError {
    AppError::unauthorized("USER_NOT_FOUND", "user not found")
}

/// Emails are compared trimmed and lowercased at every entry point.
fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    email.len() < 255
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::IdentityFields;
    use crate::services::auth::clock::FixedClock;
    use crate::services::auth::jwt::{DEFAULT_ISSUER, TokenTtl};
    use crate::services::auth::password::MinLength;
    use crate::services::users::InMemoryUserDirectory;

    const T0: i64 = 1_700_000_000;

    fn service() -> (TokenService, Arc<InMemoryUserDirectory>) {
        let codec = TokenCodec::new("svc-secret", DEFAULT_ISSUER, TokenTtl::default())
            .unwrap()
            .with_clock(Arc::new(FixedClock(T0)));
        let users = Arc::new(InMemoryUserDirectory::new());
        let svc = TokenService::new(Arc::new(codec), users.clone(), Arc::new(MinLength::default()));
        (svc, users)
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            full_name: "Jane Doe".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone_number: "0900".to_string(),
        }
    }

    #[tokio::test]
    async fn register_issues_a_user_token_pair() {
        let (svc, _) = service();
        let out = svc.register(registration("jane@example.com", "password1")).await.unwrap();

        let access = svc
            .codec()
            .validate(&out.tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.subject, out.user.id);
        assert_eq!(access.role, Role::User);
        assert_eq!(access.display_name, "Jane Doe");
        assert!(
            svc.codec()
                .validate(&out.tokens.refresh_token, TokenKind::Refresh)
                .is_ok()
        );
    }

    #[tokio::test]
    async fn register_rejects_weak_password_and_bad_email() {
        let (svc, _) = service();
        let weak = svc.register(registration("a@example.com", "short")).await.unwrap_err();
        assert_eq!(weak.code(), "WEAK_PASSWORD");

        let email = svc.register(registration("not-an-email", "password1")).await.unwrap_err();
        assert_eq!(email.code(), "INVALID_EMAIL_FORMAT");
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (svc, _) = service();
        svc.register(registration("a@example.com", "password1")).await.unwrap();
        let err = svc.register(registration("a@example.com", "password1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn login_checks_credentials_and_activity() {
        let (svc, users) = service();
        let registered = svc.register(registration("a@example.com", "password1")).await.unwrap();

        let ok = svc.login("a@example.com", "password1").await.unwrap();
        assert_eq!(ok.user.id, registered.user.id);

        let wrong = svc.login("a@example.com", "password2").await.unwrap_err();
        assert_eq!(wrong.code(), "INVALID_CREDENTIALS");
        let unknown = svc.login("b@example.com", "password1").await.unwrap_err();
        assert_eq!(unknown.code(), "INVALID_CREDENTIALS");

        users.set_active(&registered.user.id, false).await.unwrap();
        let inactive = svc.login("a@example.com", "password1").await.unwrap_err();
        assert_eq!(inactive.code(), "USER_INACTIVE");
    }

    #[tokio::test]
    async fn refresh_accepts_only_refresh_tokens() {
        let (svc, _) = service();
        let out = svc.register(registration("a@example.com", "password1")).await.unwrap();

        let access = svc.refresh(&out.tokens.refresh_token).await.unwrap();
        assert!(svc.codec().validate(&access, TokenKind::Access).is_ok());

        let err = svc.refresh(&out.tokens.access_token).await.unwrap_err();
        assert_eq!(err.code(), "AUTH_TOKEN_INVALID");
    }

    #[tokio::test]
    async fn seed_admin_is_idempotent() {
        let (svc, _) = service();
        let first = svc.seed_admin("root@example.com", "rootpass1").await.unwrap();
        let second = svc.seed_admin("root@example.com", "rootpass1").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.role, Role::Admin);
    }

    #[tokio::test]
    async fn mixed_case_seed_email_logs_in_with_any_casing() {
        let (svc, _) = service();
        let seeded = svc.seed_admin(" Root@Example.COM ", "rootpass1").await.unwrap();
        assert_eq!(seeded.email, "root@example.com");

        for email in ["Root@Example.COM", "root@example.com", "  ROOT@EXAMPLE.COM"] {
            let out = svc.login(email, "rootpass1").await.unwrap();
            assert_eq!(out.user.id, seeded.id, "{email}");
        }

        let again = svc.seed_admin("root@example.com", "other-pass").await.unwrap();
        assert_eq!(again.id, seeded.id);
    }

    #[tokio::test]
    async fn register_stores_normalized_email() {
        let (svc, _) = service();
        let out = svc.register(registration("Jane@Example.com", "password1")).await.unwrap();
        assert_eq!(out.user.email, "jane@example.com");

        let dup = svc.register(registration("JANE@example.com", "password1")).await.unwrap_err();
        assert!(matches!(dup, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn refresh_for_unknown_subject_is_user_not_found() {
        let (svc, _) = service();
        let ghost = IdentityFields {
            subject: "no-such-user".to_string(),
            email: "ghost@example.com".to_string(),
            display_name: "Ghost".to_string(),
            phone: String::new(),
            role: Role::User,
        };
        let pair = svc.codec().new_token_pair(&ghost).unwrap();

        let err = svc.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn update_profile_needs_a_field_and_keeps_the_rest() {
        let (svc, _) = service();
        let out = svc.register(registration("a@example.com", "password1")).await.unwrap();

        let empty = svc
            .update_profile(
                &out.user.id,
                ProfileUpdate {
                    full_name: Some("  ".to_string()),
                    phone_number: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(empty.code(), "DATA_REQUEST_INVALID");

        let updated = svc
            .update_profile(
                &out.user.id,
                ProfileUpdate {
                    full_name: Some("Jane Smith".to_string()),
                    phone_number: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Jane Smith");
        assert_eq!(updated.phone_number, "0900");

        let missing = svc
            .update_profile(
                "no-such-user",
                ProfileUpdate {
                    full_name: Some("X".to_string()),
                    phone_number: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(missing.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn change_password_checks_old_and_new() {
        let (svc, _) = service();
        let out = svc.register(registration("a@example.com", "password1")).await.unwrap();
        let id = &out.user.id;

        let missing = svc.change_password(id, "", "password2").await.unwrap_err();
        assert_eq!(missing.code(), "DATA_REQUEST_INVALID");

        let same = svc.change_password(id, "password1", "password1").await.unwrap_err();
        assert_eq!(same.code(), "DATA_REQUEST_INVALID");

        let weak = svc.change_password(id, "password1", "short").await.unwrap_err();
        assert_eq!(weak.code(), "WEAK_PASSWORD");

        let wrong = svc.change_password(id, "password9", "password2").await.unwrap_err();
        assert_eq!(wrong.code(), "INVALID_CREDENTIALS");

        svc.change_password(id, "password1", "password2").await.unwrap();
        assert_eq!(
            svc.login("a@example.com", "password1").await.unwrap_err().code(),
            "INVALID_CREDENTIALS"
        );
        assert!(svc.login("a@example.com", "password2").await.is_ok());
    }
}
