//! Bearer token repository.
//!
//! One opaque token per user, minted on first login and reused afterwards.
//! Tokens do not expire or rotate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hello_laundry_core::{Mobile, UserId};

use super::RepositoryError;
use crate::models::{AuthToken, CurrentUser};

#[derive(sqlx::FromRow)]
struct TokenRow {
    key: String,
    user_id: i32,
    created_at: DateTime<Utc>,
}

/// Repository for bearer token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Return the user's existing token, or persist `candidate_key` as a new
    /// one.
    ///
    /// The no-op `DO UPDATE` makes the insert return the surviving row either
    /// way, so two concurrent logins both receive the same key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        candidate_key: &str,
    ) -> Result<AuthToken, RepositoryError> {
        let row: TokenRow = sqlx::query_as(
            "INSERT INTO auth_token (key, user_id) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = auth_token.user_id \
             RETURNING key, user_id, created_at",
        )
        .bind(candidate_key)
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(AuthToken {
            key: row.key,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        })
    }

    /// Resolve a presented key to its active owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored mobile is invalid.
    pub async fn user_for_key(&self, key: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct OwnerRow {
            id: i32,
            mobile: String,
        }

        let row: Option<OwnerRow> = sqlx::query_as(
            "SELECT u.id, u.mobile FROM auth_token t \
             JOIN laundry_user u ON u.id = t.user_id \
             WHERE t.key = $1 AND u.is_active",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let mobile = Mobile::parse(&r.mobile).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
                })?;
                Ok(Some(CurrentUser {
                    id: UserId::new(r.id),
                    mobile,
                }))
            }
            None => Ok(None),
        }
    }
}
