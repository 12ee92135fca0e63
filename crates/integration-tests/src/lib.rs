//! Integration tests for Hello Laundry.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p hello-laundry-cli -- migrate
//!
//! # Start the API server
//! cargo run -p hello-laundry-api
//!
//! # Run the full suite, including ignored end-to-end tests
//! cargo test -p hello-laundry-integration-tests -- --include-ignored
//! ```
//!
//! End-to-end tests talk to the running server over HTTP and read the `otp`
//! table directly to learn issued codes (the API never returns them). They
//! are `#[ignore]`d so a plain `cargo test` stays green without live
//! services.

use rand::Rng;
use reqwest::Client;
use sqlx::PgPool;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client fails to build.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// Connect to the test database.
///
/// # Panics
///
/// Panics if `API_DATABASE_URL`/`DATABASE_URL` is unset or unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("API_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A fresh mobile number, so each run starts from a clean identity.
#[must_use]
pub fn unique_mobile() -> String {
    let suffix: u64 = rand::rng().random_range(0..=999_999_999);
    format!("+97450{suffix:09}")
}

/// Read the newest issued code for a contact straight from the database.
///
/// # Panics
///
/// Panics if the query fails or no code was issued.
pub async fn latest_otp(pool: &PgPool, mobile: &str) -> String {
    sqlx::query_scalar(
        "SELECT code FROM otp WHERE contact = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(mobile)
    .fetch_one(pool)
    .await
    .expect("No OTP issued for contact")
}
