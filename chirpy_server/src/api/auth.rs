//! Session handlers: login, refresh and revoke.
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "walt@breakingbad.com", "password": "04234"}'
//! ```
//!
//! Refresh and revoke take the refresh token as a bearer credential:
//! ```bash
//! curl -X POST http://localhost:8080/api/refresh \
//!   -H "Authorization: Bearer <refresh token>"
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chirpy::User;
use chirpy::auth::LoginRequest;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, auth_error, json_body};
use crate::{logging, metrics};

/// The user plus a fresh session
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    /// Access token (JWT)
    pub token: String,
    pub refresh_token: String,
}

/// A newly minted access token
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Authenticate a user and open a session.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "walt@breakingbad.com",
///   "password": "04234",
///   "expires_in_seconds": 600  // Optional, capped at 3600
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is not the JSON above
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(payload)?;
    match state.auth_manager.login(request).await {
        Ok((user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(LoginResponse {
                user,
                token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            if e.is_unauthorized() {
                logging::log_security_event("failed_login", None, "Invalid email or password");
            }
            Err(auth_error(e))
        }
    }
}

/// Exchange a refresh token for a new access token.
///
/// The refresh token itself is not rotated.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing header, or unknown, expired or revoked token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let result = state.auth_manager.refresh(&headers).await;
    metrics::token_refreshes_total(result.is_ok());

    let token = result.map_err(auth_error)?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke a refresh token.
///
/// Answers `204 No Content` whether or not the token was live, so the
/// endpoint cannot be used to probe token validity.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or malformed `Authorization` header
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state.auth_manager.revoke(&headers).await.map_err(auth_error)?;
    metrics::token_revocations_total();
    Ok(StatusCode::NO_CONTENT)
}
