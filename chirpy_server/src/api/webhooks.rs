//! Payment provider ("Polka") webhooks.
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/polka/webhooks \
//!   -H "Authorization: ApiKey <key>" \
//!   -H "Content-Type: application/json" \
//!   -d '{"event": "user.upgraded", "data": {"user_id": "..."}}'
//! ```

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState, INVALID_BODY_MESSAGE, auth_error, error_response};
use crate::{logging, metrics};

/// The only event acted upon; everything else is acknowledged and dropped
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaEventData>,
}

#[derive(Debug, Deserialize)]
pub struct PolkaEventData {
    pub user_id: Uuid,
}

/// Upgrade a user to Chirpy Red.
///
/// The API key is checked before the body is read.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong `ApiKey`
/// - `400 Bad Request`: Body is not an event, or `user.upgraded` without `data.user_id`
/// - `404 Not Found`: No such user
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = state.auth_manager.verify_service_key(&headers) {
        logging::log_security_event("webhook_rejected", None, &e.to_string());
        return Err(auth_error(e));
    }

    let payload: PolkaEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected webhook body");
        error_response(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE)
    })?;

    if payload.event != USER_UPGRADED_EVENT {
        metrics::webhook_events_total(&payload.event, false);
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = payload
        .data
        .map(|data| data.user_id)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Missing data.user_id"))?;

    state
        .auth_manager
        .upgrade_to_chirpy_red(user_id)
        .await
        .map_err(auth_error)?;

    metrics::webhook_events_total(&payload.event, true);
    tracing::info!(user_id = %user_id, "Upgraded user to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
