//! Database layer for verdant.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::log::LevelFilter;
use verdant_common::{config::DatabaseConfig, AppError};

/// Connect to the database described by `config`.
///
/// Pool sizing and the connect timeout come from the config; the idle and
/// lifetime limits are fixed, tuned for a long-running server process.
pub async fn init(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let timeout = Duration::from_secs(config.connect_timeout);

    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool ready"
    );

    Ok(db)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    tracing::info!("Database schema is up to date");

    Ok(())
}
