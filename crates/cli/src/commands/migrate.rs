//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `MERCATO_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use super::{CommandError, session_store};

/// Create the `tower_sessions` schema and session table.
///
/// Safe to run repeatedly.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the DDL fails.
pub async fn sessions() -> Result<(), CommandError> {
    let store = session_store().await?;

    tracing::info!("Running session store migrations...");
    store.migrate().await?;

    tracing::info!("Session store migrations complete!");
    Ok(())
}
