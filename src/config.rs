/*
 * Responsibility
 * - 環境変数や設定の読み込み (JWT secret, issuer, TTL, CORS 許可, public routes など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - from_lookup で env を触らずにテストできるようにする
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::Whitelist;
use crate::services::auth::jwt::{
    DEFAULT_ACCESS_TTL_SECONDS, DEFAULT_ISSUER, DEFAULT_REFRESH_TTL_SECONDS, TokenTtl,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Account created at startup when both ADMIN_EMAIL and ADMIN_PASSWORD are set.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub auth_issuer: String,
    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,

    pub public_routes: Whitelist,
    pub admin: Option<AdminSeed>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("auth_issuer", &self.auth_issuer)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("public_routes", &self.public_routes.entries().len())
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let auth_issuer = lookup("AUTH_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let access_token_ttl_seconds = parse_ttl(
            lookup("ACCESS_TOKEN_TTL_SECONDS"),
            "ACCESS_TOKEN_TTL_SECONDS",
            DEFAULT_ACCESS_TTL_SECONDS,
        )?;
        let refresh_token_ttl_seconds = parse_ttl(
            lookup("REFRESH_TOKEN_TTL_SECONDS"),
            "REFRESH_TOKEN_TTL_SECONDS",
            DEFAULT_REFRESH_TTL_SECONDS,
        )?;

        let public_routes = match lookup("AUTH_PUBLIC_ROUTES").filter(|s| !s.trim().is_empty()) {
            Some(raw) => {
                Whitelist::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_PUBLIC_ROUTES"))?
            }
            None => Whitelist::jobbly_defaults(),
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            auth_issuer,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            public_routes,
            admin,
        })
    }

    pub fn token_ttl(&self) -> TokenTtl {
        TokenTtl {
            access_seconds: self.access_token_ttl_seconds,
            refresh_seconds: self.refresh_token_ttl_seconds,
        }
    }
}

/// Upper bound for any token lifetime: 10 years.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

fn parse_ttl(raw: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => match v.trim().parse::<u64>() {
            Ok(n) if (1..=MAX_TOKEN_TTL_SECONDS).contains(&n) => Ok(n),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}
