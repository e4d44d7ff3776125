//! User account handlers.
//!
//! Register:
//! ```bash
//! curl -X POST http://localhost:8080/api/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "walt@breakingbad.com", "password": "04234"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chirpy::User;
use chirpy::auth::UpdateCredentials;
use serde::Deserialize;

use super::{ApiError, AppState, auth_error, json_body};
use crate::{logging, metrics};

/// Email and password, for both registration and credential changes
#[derive(Debug, Deserialize)]
pub struct CredentialsPayload {
    pub email: String,
    pub password: String,
}

/// Create a new user account.
///
/// # Response
///
/// `201 Created` with the user (never the password hash):
/// ```json
/// {
///   "id": "50746277-23c6-4d85-a890-564c0044c2fb",
///   "created_at": "2021-07-07T00:00:00Z",
///   "updated_at": "2021-07-07T00:00:00Z",
///   "email": "walt@breakingbad.com",
///   "is_chirpy_red": false
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, invalid email or empty password
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let payload = json_body(payload)?;
    let user = state
        .auth_manager
        .register(&payload.email, &payload.password)
        .await
        .map_err(auth_error)?;

    metrics::users_registered_total();
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace the caller's email and password.
///
/// Requires `Authorization: Bearer <access token>`. All of the user's
/// refresh tokens are revoked, so other sessions must log in again.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `400 Bad Request`: Invalid email or empty password
/// - `409 Conflict`: Email belongs to another user
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let payload = json_body(payload)?;
    let user = state
        .auth_manager
        .change_credentials(
            &headers,
            UpdateCredentials {
                email: payload.email,
                password: payload.password,
            },
        )
        .await
        .map_err(|e| {
            if e.is_unauthorized() {
                logging::log_security_event("credential_change_rejected", None, &e.to_string());
            }
            auth_error(e)
        })?;

    Ok(Json(user))
}
