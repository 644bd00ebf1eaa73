//! Storefront entry-point: reads configuration, applies migrations, wires the
//! adapters and serves the REST API.

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use storefront::config::{BuildMode, settings_from_env};
use storefront::inbound::http::health::HealthState;
use storefront::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use storefront::server::{ServerConfig, build_http_state, create_server, postgres_adapters};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| {
            error!(error = %e, "invalid configuration");
            std::io::Error::other(e)
        })?;
    info!(?settings, "configuration loaded");

    run_pending_migrations(&settings.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.as_str())
            .with_max_size(settings.db_max_connections),
    )
    .await
    .map_err(std::io::Error::other)?;

    let clock = Arc::new(DefaultClock);
    let tokens = JwtTokenService::new(&settings.jwt_secret, settings.token_ttl, clock.clone());
    let hasher = Argon2PasswordHasher::new().map_err(std::io::Error::other)?;
    let http_state = build_http_state(postgres_adapters(pool, hasher, tokens, clock));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::from(&settings),
    )?;
    info!(host = %settings.bind_host, port = settings.port, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
