//! User repository.
//!
//! Identity rows are keyed by mobile number. All reads re-validate contact
//! fields through the core newtypes so a corrupt row surfaces as
//! `DataCorruption` instead of leaking onwards.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hello_laundry_core::{Email, Mobile, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    mobile: String,
    email: Option<String>,
    full_name: Option<String>,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let mobile = Mobile::parse(&self.mobile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
        })?;
        let email = self
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(User {
            id: UserId::new(self.id),
            mobile,
            email,
            full_name: self.full_name,
            is_active: self.is_active,
            date_joined: self.date_joined,
        })
    }
}

const USER_COLUMNS: &str = "id, mobile, email, full_name, is_active, date_joined";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by mobile number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored contact is invalid.
    pub async fn get_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM laundry_user WHERE mobile = $1"
        ))
        .bind(mobile.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored contact is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM laundry_user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored contact is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM laundry_user WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with a mobile number and optional email.
    ///
    /// There is no credential-based login path; OTP is the sole
    /// authentication factor, so no password material is stored at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the mobile or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        mobile: &Mobile,
        email: Option<&Email>,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO laundry_user (mobile, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(mobile.as_str())
        .bind(email.map(Email::as_str))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("contact already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Attach an email to a user that has none.
    ///
    /// A no-op when the user already carries an email: backfill never
    /// overwrites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_email_if_absent(
        &self,
        id: UserId,
        email: &Email,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE laundry_user SET email = $2 WHERE id = $1 AND email IS NULL")
            .bind(id.as_i32())
            .bind(email.as_str())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(())
    }

    /// Set the customer's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_full_name(&self, id: UserId, full_name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE laundry_user SET full_name = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(full_name)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
