//! CLI command implementations.

pub mod migrate;
pub mod sessions;

use mercato_storefront::config::{ConfigError, database_url_from_env};
use mercato_storefront::db;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    Store(#[from] tower_sessions::session_store::Error),
}

/// Connect to the session database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url_from_env()?;
    tracing::info!("Connecting to session database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Session store over the environment's database.
async fn session_store() -> Result<PostgresStore, CommandError> {
    Ok(PostgresStore::new(connect().await?))
}
