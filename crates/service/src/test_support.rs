#![cfg(test)]
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

/// Fresh migrated database per test. Defaults to in-memory SQLite;
/// `TEST_DATABASE_URL` points the suite at a real server instead.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let mut cfg = DatabaseConfig { url, ..DatabaseConfig::default() };
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
