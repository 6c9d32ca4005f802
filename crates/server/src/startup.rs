use std::net::SocketAddr;

use axum::Router;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Where the running configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    Env,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file {path}"),
            ConfigSource::Env => f.write_str("environment"),
        }
    }
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

/// `config.toml` (or `CONFIG_PATH`) when present, otherwise environment only.
pub fn load_config() -> Result<(AppConfig, ConfigSource), StartupError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_config_from(&path)
}

/// Only a missing file falls back to the environment; a file that exists but
/// does not parse is a startup error.
pub fn load_config_from(path: &str) -> Result<(AppConfig, ConfigSource), StartupError> {
    let (mut cfg, source) = match configs::load_from_file(path) {
        Ok(cfg) => (cfg, ConfigSource::File(path.to_string())),
        Err(e) if is_missing_file(&e) => (AppConfig::from_env(), ConfigSource::Env),
        Err(e) => return Err(StartupError::InvalidConfig(format!("{path}: {e}"))),
    };
    if cfg.database.url.trim().is_empty() {
        cfg.database.url = models::db::DATABASE_URL.clone();
    }
    cfg.normalize_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    Ok((cfg, source))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate and assemble the router without binding a socket.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.map_err(anyhow::Error::from)?;
    info!("migrations applied");
    Ok(routes::build_router(ServerState::new(db), build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    info!("server stopped");
    Ok(())
}
