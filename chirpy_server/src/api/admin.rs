//! Admin handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
};
use std::sync::atomic::Ordering;

use super::{ApiError, AppState, error_response};
use crate::config::DEV_PLATFORM;

/// Page showing how often the static site was visited.
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.file_server_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {hits} times!</p>
  </body>
</html>"
    ))
}

/// Zero the visit counter and delete every user, token and chirp.
///
/// Only available when the platform is `dev`; anything else gets `403`.
pub async fn reset(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    if state.platform != DEV_PLATFORM {
        tracing::warn!(platform = %state.platform, "Reset refused outside dev platform");
        return Err(error_response(StatusCode::FORBIDDEN, "Forbidden"));
    }

    state.file_server_hits.store(0, Ordering::Relaxed);
    state.repositories.clear_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to clear data");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    tracing::warn!("All users, tokens and chirps deleted");
    Ok("OK")
}
