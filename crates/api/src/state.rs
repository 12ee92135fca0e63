//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::sms::{SmsClient, SmsError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds only what handlers touch after
/// startup; the rest of the configuration stays in `main`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    sms: SmsClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMS client fails to build from the
    /// configuration.
    pub fn new(config: &ApiConfig, pool: PgPool) -> Result<Self, SmsError> {
        let sms = SmsClient::new(config.sms.as_ref())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { pool, sms }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the SMS gateway client.
    #[must_use]
    pub fn sms(&self) -> &SmsClient {
        &self.inner.sms
    }
}
