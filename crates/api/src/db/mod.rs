//! Database operations for the marketplace `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `laundry_user` - Customer identities keyed by mobile
//! - `otp` - One-time passcodes (history retained, most-recent-wins)
//! - `auth_token` - Long-lived opaque bearer tokens, one per user
//! - `laundry` / `item` / `item_price` - Catalog collaborators (read-only here)
//! - `cart` / `cart_item` - Active carts and their merged line items
//! - `laundry_order` / `order_item` - Immutable order snapshots
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p hello-laundry-cli -- migrate
//! ```
//! They are never run automatically on startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod orders;
pub mod otps;
pub mod tokens;
pub mod users;

/// Errors produced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Referenced row does not exist.
    #[error("row not found")]
    NotFound,

    /// Unique constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed domain validation on read.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
