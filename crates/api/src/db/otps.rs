//! OTP repository.
//!
//! One row per send request: history is retained rather than upserted, so a
//! resend never clobbers state mid-verify. Verification always compares
//! against the most recently created row for the contact.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hello_laundry_core::{Mobile, OtpCode, OtpId};

use super::RepositoryError;
use crate::models::OtpRecord;

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: i32,
    contact: String,
    code: String,
    created_at: DateTime<Utc>,
}

impl OtpRow {
    fn into_record(self) -> Result<OtpRecord, RepositoryError> {
        let contact = Mobile::parse(&self.contact).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact in database: {e}"))
        })?;
        let code = OtpCode::parse(&self.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid otp code in database: {e}"))
        })?;

        Ok(OtpRecord {
            id: OtpId::new(self.id),
            contact,
            code,
            created_at: self.created_at,
        })
    }
}

/// Repository for OTP database operations.
pub struct OtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpRepository<'a> {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a freshly issued code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        contact: &Mobile,
        code: &OtpCode,
    ) -> Result<OtpRecord, RepositoryError> {
        let row: OtpRow = sqlx::query_as(
            "INSERT INTO otp (contact, code) VALUES ($1, $2) \
             RETURNING id, contact, code, created_at",
        )
        .bind(contact.as_str())
        .bind(code.as_str())
        .fetch_one(self.pool)
        .await?;

        row.into_record()
    }

    /// The most recently created record for a contact, if any.
    ///
    /// The `id` tie-break keeps resend races deterministic when two codes
    /// land in the same timestamp tick.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_contact(
        &self,
        contact: &Mobile,
    ) -> Result<Option<OtpRecord>, RepositoryError> {
        let row: Option<OtpRow> = sqlx::query_as(
            "SELECT id, contact, code, created_at FROM otp \
             WHERE contact = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(contact.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OtpRow::into_record).transpose()
    }

    /// Delete a consumed record (single-use enforcement).
    ///
    /// # Returns
    ///
    /// `true` if the row was deleted, `false` if something else consumed it
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OtpId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM otp WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
