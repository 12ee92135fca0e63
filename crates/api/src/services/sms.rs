//! SMS gateway client for OTP delivery.
//!
//! When no gateway is configured the client logs the message instead of
//! sending it, which is the local-development mode: the code still shows up
//! in the server logs so the flow can be exercised end to end.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use hello_laundry_core::{Mobile, OtpCode};

use crate::config::SmsConfig;

/// Errors that can occur when dispatching a message.
#[derive(Debug, Error)]
pub enum SmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },

    /// Failed to build the client.
    #[error("client build error: {0}")]
    Build(String),
}

/// SMS gateway client.
#[derive(Clone)]
pub struct SmsClient {
    client: reqwest::Client,
    gateway: Option<Gateway>,
}

#[derive(Clone)]
struct Gateway {
    endpoint: String,
    sender_id: Option<String>,
}

impl SmsClient {
    /// Create a client from the optional gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns `SmsError::Build` if the API key cannot be used as a header
    /// value, or if the HTTP client fails to build.
    pub fn new(config: Option<&SmsConfig>) -> Result<Self, SmsError> {
        let Some(config) = config else {
            return Ok(Self {
                client: reqwest::Client::new(),
                gateway: None,
            });
        };

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| SmsError::Build(format!("invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            gateway: Some(Gateway {
                endpoint: config.endpoint.clone(),
                sender_id: config.sender_id.clone(),
            }),
        })
    }

    /// Deliver a one-time code to a mobile number.
    ///
    /// # Errors
    ///
    /// Returns `SmsError::Http` if the request fails to send.
    /// Returns `SmsError::Gateway` if the gateway rejects the message.
    pub async fn send_otp(&self, to: &Mobile, code: &OtpCode) -> Result<(), SmsError> {
        let Some(gateway) = &self.gateway else {
            // Log-only dispatch for local development
            tracing::info!(mobile = %to, code = %code.as_str(), "SMS gateway not configured, logging OTP");
            return Ok(());
        };

        let body = serde_json::json!({
            "to": to.as_str(),
            "message": format!("Your verification code is {}", code.as_str()),
            "sender_id": gateway.sender_id,
        });

        let response = self
            .client
            .post(&gateway.endpoint)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SmsError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
