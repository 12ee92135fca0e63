//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into this
//! binary at compile time, so the tool works without a source checkout.
//! They are never run automatically by the API binary.

use super::{CommandError, connect};

/// Run API database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Connecting to API database...");
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
