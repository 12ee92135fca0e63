//! Expired-OTP sweep command.
//!
//! Verification only ever reads the most recent code per contact, so stale
//! rows are harmless but accumulate forever. This deletes every row older
//! than the validity window; run it from cron.

use chrono::Utc;

use hello_laundry_core::OTP_VALIDITY;

use super::{CommandError, connect};

/// Delete OTP rows past the validity window.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or the delete fails.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Connecting to API database...");
    let pool = connect().await?;

    let cutoff = Utc::now() - OTP_VALIDITY;
    let result = sqlx::query("DELETE FROM otp WHERE created_at < $1")
        .bind(cutoff)
        .execute(&pool)
        .await?;

    tracing::info!(deleted = result.rows_affected(), "Expired OTPs swept");
    Ok(())
}
