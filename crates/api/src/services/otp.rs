//! OTP issue and verify service.
//!
//! Issue persists the code first and dispatches the SMS on a background
//! task, so a slow or failing gateway never blocks or fails the request.
//! Verify checks the most recent code for the contact, enforces the
//! validity window, and consumes the record.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use hello_laundry_core::{Mobile, OtpCode};

use crate::db::RepositoryError;
use crate::db::otps::OtpRepository;
use crate::services::sms::SmsClient;

/// Errors that can occur during OTP operations.
#[derive(Debug, Error)]
pub enum OtpError {
    /// The submitted code is wrong, expired, already used, or was never
    /// issued. One variant for all of these so responses don't reveal which
    /// check failed.
    #[error("invalid or expired OTP")]
    InvalidOrExpired,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// OTP service.
pub struct OtpService<'a> {
    otps: OtpRepository<'a>,
    sms: &'a SmsClient,
}

impl<'a> OtpService<'a> {
    /// Create a new OTP service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, sms: &'a SmsClient) -> Self {
        Self {
            otps: OtpRepository::new(pool),
            sms,
        }
    }

    /// Issue a fresh code for a contact and dispatch it over SMS.
    ///
    /// Reissuing is always allowed; the newest record wins at verify time.
    /// Delivery runs on a spawned task and a failed send is only logged,
    /// the client retries by requesting another code.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::Repository` if the code cannot be persisted.
    pub async fn issue(&self, contact: &Mobile) -> Result<(), OtpError> {
        let code = OtpCode::generate();
        self.otps.insert(contact, &code).await?;

        let sms = self.sms.clone();
        let to = contact.clone();
        tokio::spawn(async move {
            if let Err(e) = sms.send_otp(&to, &code).await {
                tracing::warn!(mobile = %to, error = %e, "Failed to dispatch OTP SMS");
            }
        });

        Ok(())
    }

    /// Verify a submitted code against the most recent one for the contact.
    ///
    /// The record is deleted on success, so a code can be used exactly once.
    /// Two concurrent verifies race on the delete and only the winner
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidOrExpired` if no code is outstanding, the
    /// submitted code doesn't match the newest record, the window has
    /// passed, or the record was consumed first.
    /// Returns `OtpError::Repository` for database errors.
    pub async fn verify(&self, contact: &Mobile, submitted: &str) -> Result<(), OtpError> {
        // A malformed code can never match a generated one
        let Ok(submitted) = OtpCode::parse(submitted) else {
            return Err(OtpError::InvalidOrExpired);
        };

        let record = self
            .otps
            .latest_for_contact(contact)
            .await?
            .ok_or(OtpError::InvalidOrExpired)?;

        if record.code != submitted {
            return Err(OtpError::InvalidOrExpired);
        }

        if OtpCode::is_expired(record.created_at, Utc::now()) {
            return Err(OtpError::InvalidOrExpired);
        }

        if !self.otps.delete(record.id).await? {
            return Err(OtpError::InvalidOrExpired);
        }

        Ok(())
    }
}
