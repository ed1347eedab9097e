/*
 * Responsibility
 * - Config読み込み → 依存生成 (TokenCodec / TokenService / UserDirectory) → Router 組み立て
 * - Middleware の適用順: http → cors → security headers → optional identity → access
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::password::MinLength;
use crate::services::auth::{TokenCodec, TokenService};
use crate::services::users::{InMemoryUserDirectory, UserDirectory};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,jobbly_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting auth API in {:?} mode on {} ({} public routes)",
        config.app_env,
        config.addr,
        config.public_routes.entries().len()
    );

    let users: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
    let state = build_state(&config, users)?;

    if let Some(admin) = &config.admin {
        state.auth.seed_admin(&admin.email, &admin.password).await?;
    }

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, addr = %config.addr, "bind failed");
            AppError::Internal
        })?;
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!(error = %e, "server error");
        AppError::Internal
    })?;

    Ok(())
}

/// Process-level services, built once and shared read-only.
pub fn build_state(config: &Config, users: Arc<dyn UserDirectory>) -> Result<AppState, AppError> {
    let tokens = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        config.auth_issuer.clone(),
        config.token_ttl(),
    )?);

    let auth = Arc::new(TokenService::new(
        tokens.clone(),
        users.clone(),
        Arc::new(MinLength::default()),
    ));

    Ok(AppState::new(
        tokens,
        Arc::new(config.public_routes.clone()),
        auth,
        users,
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes());

    let router = middleware::auth::apply(router, state.clone()).with_state(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);

    middleware::http::apply(router)
}
