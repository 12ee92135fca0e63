//! Account route handlers: OTP login flow and profile updates.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hello_laundry_core::{Email, Mobile, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::services::{AuthService, OtpService};
use crate::state::AppState;

/// Request body for `POST /api/accounts/send-otp`.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub mobile: Option<String>,
    pub email: Option<String>,
}

/// Response body for `POST /api/accounts/send-otp`.
#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub contact: String,
}

/// Request body for `POST /api/accounts/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub mobile: String,
    pub otp: String,
    pub email: Option<String>,
}

/// Response body for `POST /api/accounts/verify-otp`.
#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub token: String,
    pub user: UserPayload,
}

/// User summary returned after a successful login.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user_id: UserId,
    pub mobile: Mobile,
    pub email: Option<Email>,
    pub full_name: Option<String>,
}

/// Request body for `POST /api/accounts/customer/set-name`.
#[derive(Debug, Deserialize)]
pub struct SetNameRequest {
    pub full_name: String,
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Issue an OTP to a mobile number.
///
/// Always allowed, including while an earlier code is still outstanding;
/// only the newest code verifies.
#[instrument(skip(state, body))]
pub async fn send_otp(
    State(state): State<AppState>,
    AppJson(body): AppJson<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>> {
    let Some(mobile) = body.mobile.as_deref() else {
        return Err(AppError::BadRequest(
            "A mobile number is required".to_string(),
        ));
    };
    let mobile = Mobile::parse(mobile).map_err(|e| AppError::BadRequest(e.to_string()))?;

    OtpService::new(state.pool(), state.sms())
        .issue(&mobile)
        .await?;

    tracing::info!(mobile = %mobile, "OTP issued");

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent".to_string(),
        contact: mobile.into_inner(),
    }))
}

/// Verify an OTP, resolve the account, and return its token.
#[instrument(skip(state, body))]
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(body): AppJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    let mobile = Mobile::parse(&body.mobile).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    OtpService::new(state.pool(), state.sms())
        .verify(&mobile, &body.otp)
        .await?;

    let (user, token) = AuthService::new(state.pool())
        .login(&mobile, email.as_ref())
        .await?;

    tracing::info!(user_id = %user.id, "Login successful");

    Ok(Json(VerifyOtpResponse {
        success: true,
        token: token.key,
        user: UserPayload {
            user_id: user.id,
            mobile: user.mobile,
            email: user.email,
            full_name: user.full_name,
        },
    }))
}

/// Set the authenticated customer's display name.
#[instrument(skip(state, body))]
pub async fn set_name(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<SetNameRequest>,
) -> Result<Json<AckResponse>> {
    let full_name = body.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::BadRequest("A name is required".to_string()));
    }

    UserRepository::new(state.pool())
        .set_full_name(user.id, full_name)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("user".to_string()),
            other => AppError::Database(other),
        })?;

    Ok(Json(AckResponse {
        success: true,
        message: "Name updated".to_string(),
    }))
}
