//! Backend entry-point: loads settings, prepares storage and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = settings
        .server_config()
        .wrap_err("invalid server settings")?;
    let config = attach_database(&settings, config).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to start server")?;
    info!("server started");
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}

/// Run migrations and attach a pool when a database URL is configured.
async fn attach_database(
    settings: &AppSettings,
    config: ServerConfig,
) -> color_eyre::Result<ServerConfig> {
    let Some(url) = settings.database_url() else {
        return Ok(config);
    };

    run_pending_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("failed to build database pool")?;
    Ok(config.with_db_pool(pool))
}
