//! Session store maintenance.

use tower_sessions::session_store::ExpiredDeletion;

use super::{CommandError, session_store};

/// Delete every expired session row.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn purge() -> Result<(), CommandError> {
    let store = session_store().await?;

    tracing::info!("Deleting expired sessions...");
    store.delete_expired().await?;

    tracing::info!("Expired sessions deleted");
    Ok(())
}
