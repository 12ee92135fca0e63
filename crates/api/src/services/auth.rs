//! Identity resolution and token issuance.
//!
//! Runs after a successful OTP verification. Resolution order is mobile
//! first, then email, then a fresh account; the mobile number is the
//! primary key of an identity and is never rewritten on an email match.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use hello_laundry_core::{Email, Mobile};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::UserRepository;
use crate::models::{AuthToken, User};

/// Raw byte length of a freshly minted token key.
const TOKEN_KEY_BYTES: usize = 20;

/// Errors that can occur during identity resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented email already belongs to a different account.
    #[error("an account with this email already exists")]
    IdentityConflict,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
        }
    }

    /// Resolve a verified contact to an account and hand back its token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IdentityConflict` if the email is already taken
    /// by another account.
    /// Returns `AuthError::Repository` for database errors.
    pub async fn login(
        &self,
        mobile: &Mobile,
        email: Option<&Email>,
    ) -> Result<(User, AuthToken), AuthError> {
        let user = self.resolve_user(mobile, email).await?;
        let token = self.tokens.get_or_create(user.id, &generate_key()).await?;
        Ok((user, token))
    }

    /// Find or create the account behind a verified contact.
    ///
    /// Mobile match wins outright. Failing that, an email match reuses the
    /// existing account without touching its stored mobile. Failing both, a
    /// new account is created. A mobile-matched account with no email gets
    /// the presented one backfilled.
    async fn resolve_user(
        &self,
        mobile: &Mobile,
        email: Option<&Email>,
    ) -> Result<User, AuthError> {
        if let Some(mut user) = self.users.get_by_mobile(mobile).await? {
            if let Some(email) = email
                && user.email.is_none()
            {
                self.users
                    .set_email_if_absent(user.id, email)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::Conflict(_) => AuthError::IdentityConflict,
                        other => AuthError::Repository(other),
                    })?;
                user.email = Some(email.clone());
            }
            return Ok(user);
        }

        if let Some(email) = email
            && let Some(user) = self.users.get_by_email(email).await?
        {
            return Ok(user);
        }

        match self.users.create(mobile, email).await {
            Ok(user) => Ok(user),
            // A concurrent login created the row between our lookup and
            // insert; the re-read resolves to the surviving account.
            Err(RepositoryError::Conflict(_)) => self
                .users
                .get_by_mobile(mobile)
                .await?
                .ok_or(AuthError::IdentityConflict),
            Err(other) => Err(AuthError::Repository(other)),
        }
    }
}

/// Mint a fresh opaque token key.
fn generate_key() -> String {
    let bytes: [u8; TOKEN_KEY_BYTES] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_distinct_and_url_safe() {
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn generated_keys_encode_twenty_bytes() {
        let key = generate_key();
        let decoded = URL_SAFE_NO_PAD.decode(&key).unwrap();
        assert_eq!(decoded.len(), TOKEN_KEY_BYTES);
    }
}
