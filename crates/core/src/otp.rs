//! One-time-passcode generation and expiry policy.
//!
//! Codes are four decimal digits, uniform in `1000..=9999`. Collisions across
//! contacts are permitted; a code is only ever compared against the most
//! recently issued record for its own contact. Expiry is checked at verify
//! time, not proactively swept (the CLI `gc-otps` command handles cleanup).

use core::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How long an issued code remains valid.
pub const OTP_VALIDITY: TimeDelta = match TimeDelta::new(5 * 60, 0) {
    Some(delta) => delta,
    None => panic!("five minutes is a representable TimeDelta"),
};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpCodeError {
    /// The input is not exactly four characters.
    #[error("code must be exactly 4 digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("code may only contain digits")]
    NonDigit,
}

/// A four-digit one-time passcode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 4;

    /// Generate a fresh random code.
    ///
    /// The range starts at 1000 so the string form never has a leading zero.
    #[must_use]
    pub fn generate() -> Self {
        let value: u16 = rand::rng().random_range(1000..=9999);
        Self(value.to_string())
    }

    /// Parse a client-submitted code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly four ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() != Self::LENGTH {
            return Err(OtpCodeError::WrongLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a record issued at `issued_at` is past its validity window at
    /// `now`. Exactly five minutes of elapsed time is still valid.
    #[must_use]
    pub fn is_expired(issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(issued_at) > OTP_VALIDITY
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_four_digits() {
        for _ in 0..256 {
            let code = OtpCode::generate();
            assert_eq!(code.as_str().len(), 4);
            let value: u16 = code.as_str().parse().unwrap();
            assert!((1000..=9999).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn parse_accepts_exact_four_digits() {
        assert!(OtpCode::parse("4321").is_ok());
        assert!(OtpCode::parse("0000").is_ok());
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        assert!(matches!(
            OtpCode::parse("123"),
            Err(OtpCodeError::WrongLength)
        ));
        assert!(matches!(
            OtpCode::parse("12345"),
            Err(OtpCodeError::WrongLength)
        ));
        assert!(matches!(OtpCode::parse("12a4"), Err(OtpCodeError::NonDigit)));
        assert!(matches!(OtpCode::parse(""), Err(OtpCodeError::WrongLength)));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let issued = Utc::now();

        // Within the window, including the exact boundary, is valid.
        assert!(!OtpCode::is_expired(issued, issued));
        assert!(!OtpCode::is_expired(issued, issued + TimeDelta::minutes(4)));
        assert!(!OtpCode::is_expired(issued, issued + OTP_VALIDITY));

        // One second past the window is expired.
        assert!(OtpCode::is_expired(
            issued,
            issued + OTP_VALIDITY + TimeDelta::seconds(1)
        ));
    }

    #[test]
    fn codes_compare_by_value() {
        let a = OtpCode::parse("4321").unwrap();
        let b = "4321".parse::<OtpCode>().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, OtpCode::parse("1234").unwrap());
    }
}
