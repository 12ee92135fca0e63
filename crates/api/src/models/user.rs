//! User, OTP, and credential domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hello_laundry_core::{Email, Mobile, OtpCode, UserId};

/// A marketplace customer.
///
/// Created on first successful OTP verification for a new contact; never
/// deleted in the normal flow. Mobile is the identity key, email is an
/// optional attachment.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Mobile number (unique identity key).
    pub mobile: Mobile,
    /// Optional email address (unique when present).
    pub email: Option<Email>,
    /// Display name, set by the customer after signup.
    pub full_name: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// When the user first verified an OTP.
    pub date_joined: DateTime<Utc>,
}

/// A persisted one-time passcode.
///
/// One row per send request; verification checks the most recently created
/// row for the contact and deletes it on success.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// Row ID.
    pub id: hello_laundry_core::OtpId,
    /// Contact the code was issued against.
    pub contact: Mobile,
    /// The issued code.
    pub code: OtpCode,
    /// Issue timestamp; validity is measured from here.
    pub created_at: DateTime<Utc>,
}

/// A long-lived opaque bearer credential, one per user.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// The opaque key presented in the `Authorization` header.
    pub key: String,
    /// Owner of the token.
    pub user_id: UserId,
    /// When the token was minted.
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's mobile number.
    pub mobile: Mobile,
}
