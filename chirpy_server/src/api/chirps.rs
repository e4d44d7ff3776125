//! Chirp handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chirpy::Chirp;
use chirpy::chirps::{ChirpError, ChirpId, SortOrder};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState, auth_error, chirp_error, error_response, json_body};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct ChirpPayload {
    pub body: String,
}

/// Query string for `GET /api/chirps`
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

/// Post a chirp as the authenticated user.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid access token
/// - `400 Bad Request`: Malformed body, or chirp empty or longer than 140 characters
pub async fn create_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChirpPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let payload = json_body(payload)?;
    let chirp = state
        .chirp_manager
        .create(&headers, &payload.body)
        .await
        .map_err(chirp_error)?;

    metrics::chirps_created_total();
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// List chirps, optionally by one author, oldest first unless `sort=desc`.
///
/// # Errors
///
/// - `400 Bad Request`: `author_id` is not a UUID or `sort` is unknown
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let author = query
        .author_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid author_id"))?;

    let sort = query
        .sort
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<SortOrder>)
        .transpose()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?
        .unwrap_or_default();

    let chirps = state
        .chirp_manager
        .list(author, sort)
        .await
        .map_err(chirp_error)?;
    Ok(Json(chirps))
}

/// Fetch one chirp.
///
/// # Errors
///
/// - `404 Not Found`: No chirp with that ID (including IDs that are not UUIDs)
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>, ApiError> {
    let chirp_id = parse_chirp_id(&chirp_id)?;
    let chirp = state
        .chirp_manager
        .get(chirp_id)
        .await
        .map_err(chirp_error)?;
    Ok(Json(chirp))
}

/// Delete a chirp owned by the caller.
///
/// Checks run in order: authentication (`401`), existence (`404`), then
/// ownership (`403`).
pub async fn delete_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let chirp_id = match parse_chirp_id(&chirp_id) {
        Ok(id) => id,
        Err(not_found) => {
            state
                .auth_manager
                .authenticate(&headers)
                .map_err(auth_error)?;
            return Err(not_found);
        }
    };

    state
        .chirp_manager
        .delete(&headers, chirp_id)
        .await
        .map_err(chirp_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_chirp_id(raw: &str) -> Result<ChirpId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| chirp_error(ChirpError::NotFound))
}
