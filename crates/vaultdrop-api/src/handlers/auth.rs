//! Auth handlers: sign-up, login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use vaultdrop_core::config::AuthConfig;
use vaultdrop_core::error::AppError;
use vaultdrop_service::user::SignUp;

use crate::dto::request::{LoginRequest, SignUpRequest};
use crate::dto::response::{ApiResponse, LoginResponse, UserResponse};
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.user_service.register(SignUp::from(req)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            UserResponse::from(user),
        )),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), AppError> {
    let result = state.user_service.login(&req.username, &req.password).await?;

    let max_age = (result.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = session_cookie(&state.config.auth, &result.token, max_age)?;

    Ok((
        jar.add(cookie),
        Json(ApiResponse::with_message(
            "Login successful",
            LoginResponse {
                user: UserResponse::from(result.user),
                expires_at: result.expires_at,
            },
        )),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let removal = Cookie::build((state.config.auth.cookie_name.clone(), ""))
        .path("/")
        .http_only(true);

    (
        jar.remove(removal),
        Json(ApiResponse::with_message("Logged out successfully", ())),
    )
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.user_service.me(&auth).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// HttpOnly session cookie. Secure cookies use `SameSite=None` so a
/// separately hosted frontend can send them.
fn session_cookie(
    config: &AuthConfig,
    token: &str,
    max_age_seconds: i64,
) -> Result<Cookie<'static>, AppError> {
    let mut cookie = Cookie::parse(format!(
        "{}={}; Max-Age={}",
        config.cookie_name, token, max_age_seconds
    ))
    .map_err(|e| AppError::internal(format!("Failed to build session cookie: {e}")))?;

    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(config.cookie_secure);
    cookie.set_same_site(if config.cookie_secure {
        SameSite::None
    } else {
        SameSite::Lax
    });
    Ok(cookie)
}
