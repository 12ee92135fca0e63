//! Mobile number type.
//!
//! The mobile number is the primary identity key: users are created on first
//! successful OTP verification for a contact, and every OTP is issued against
//! one of these.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Mobile`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MobileError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("mobile number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters other than digits and a leading `+`.
    #[error("mobile number may only contain digits and an optional leading +")]
    InvalidCharacter,
    /// The input has fewer digits than any real subscriber number.
    #[error("mobile number must have at least {min} digits")]
    TooShort {
        /// Minimum number of digits.
        min: usize,
    },
}

/// A subscriber mobile number in loosely-validated international form.
///
/// ## Constraints
///
/// - 7-15 digits (E.164 ceiling), optionally prefixed with `+`
/// - No spaces, dashes, or other separators
///
/// ## Examples
///
/// ```
/// use hello_laundry_core::Mobile;
///
/// assert!(Mobile::parse("9990001111").is_ok());
/// assert!(Mobile::parse("+97455512345").is_ok());
///
/// assert!(Mobile::parse("").is_err());
/// assert!(Mobile::parse("555-0199").is_err());
/// assert!(Mobile::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Mobile(String);

impl Mobile {
    /// Maximum length including the optional `+` prefix.
    pub const MAX_LENGTH: usize = 16;
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;

    /// Parse a `Mobile` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, too short, or
    /// contains anything other than digits and an optional leading `+`.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        if s.is_empty() {
            return Err(MobileError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(MobileError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileError::InvalidCharacter);
        }

        if digits.len() < Self::MIN_DIGITS {
            return Err(MobileError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the mobile number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Mobile` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Mobile {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Mobile {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Mobile {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Mobile {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
