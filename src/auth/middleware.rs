//! Authentication extractors
//!
//! Resolves the calling host user from a bearer token or session cookie.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::session::{Session, verify_session_token};
use crate::AppState;
use crate::error::AppError;

fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get("session").map(|cookie| cookie.value().to_owned())
        })
}

/// Extractor for current authenticated user
///
/// Use in handlers to get the current session.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(session): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", session.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    /// Extract current user from request
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>().cloned() {
            return Ok(CurrentUser(session));
        }

        let state = AppState::from_ref(state);
        let token = extract_token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session = verify_session_token(
            &token,
            &state.config.auth.session_secret,
            chrono::Duration::seconds(state.config.auth.session_max_age),
        )?;
        parts.extensions.insert(session.clone());

        Ok(CurrentUser(session))
    }
}
