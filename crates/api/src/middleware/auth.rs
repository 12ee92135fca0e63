//! Token authentication extractor.
//!
//! Mobile clients send `Authorization: Token <key>`; `Bearer <key>` is
//! accepted as well. The key is looked up on every request, so a token
//! stops working the moment its row is deleted or the user is deactivated.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::tokens::TokenRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with `AppError::Unauthorized` (401) when the header is missing
/// or the key doesn't resolve to an active user; lookup failures surface
/// as `AppError::Database` so they get captured like any other 500.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.mobile)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_token(parts).ok_or_else(|| {
            AppError::Unauthorized("missing or malformed Authorization header".to_string())
        })?;

        let user = TokenRepository::new(state.pool())
            .user_for_key(key)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown or revoked token".to_string()))?;

        Ok(Self(user))
    }
}

/// Pull the token key out of the `Authorization` header.
fn extract_token(parts: &Parts) -> Option<&str> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim();

    let key = header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))?
        .trim();

    if key.is_empty() { None } else { Some(key) }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/api/cart/add")
            .header(header::AUTHORIZATION, value)
            .body(())
            .expect("valid request")
            .into_parts();
        parts
    }

    #[test]
    fn accepts_token_and_bearer_schemes() {
        let parts = parts_with_auth("Token abc123");
        assert_eq!(extract_token(&parts), Some("abc123"));

        let parts = parts_with_auth("Bearer abc123");
        assert_eq!(extract_token(&parts), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_keys() {
        let parts = parts_with_auth("Basic abc123");
        assert_eq!(extract_token(&parts), None);

        let parts = parts_with_auth("Token ");
        assert_eq!(extract_token(&parts), None);
    }

    #[test]
    fn missing_header_yields_none() {
        let (parts, ()) = Request::builder()
            .uri("/api/cart/add")
            .body(())
            .expect("valid request")
            .into_parts();
        assert_eq!(extract_token(&parts), None);
    }
}
