//! Session extractors: read the JWT from the session cookie or the
//! `Authorization` header and turn it into a [`Caller`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use vaultdrop_core::error::AppError;
use vaultdrop_service::Caller;

use crate::state::AppState;

/// An authenticated caller. Rejects the request with 401 when no valid
/// session token is present.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Caller);

impl AuthUser {
    /// Returns the inner `Caller`.
    pub fn caller(&self) -> &Caller {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Caller;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, &state.config.auth.cookie_name)
            .ok_or_else(|| AppError::authentication("Authentication required"))?;

        let claims = state.jwt_decoder.decode(&token)?;
        Ok(AuthUser(Caller::new(claims.user_id(), claims.username)))
    }
}

/// The caller when a valid session is present, otherwise anonymous.
///
/// An invalid or expired token is treated as no token at all; endpoints
/// that need identity reject the anonymous caller themselves.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<Caller>);

impl MaybeAuthUser {
    /// The caller, if any, in the form the services take.
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts, &state.config.auth.cookie_name) else {
            return Ok(MaybeAuthUser(None));
        };

        match state.jwt_decoder.decode(&token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(Caller::new(
                claims.user_id(),
                claims.username,
            )))),
            Err(e) => {
                debug!(error = %e.message, "Ignoring invalid session token");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

/// Session token from the cookie, falling back to a bearer header.
fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(cookie_name) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
