//! Middleware for the static file server.
//!
//! ```rust,no_run
//! use axum::{Router, middleware};
//! use tower_http::services::ServeDir;
//! # use chirpy_server::api::middleware::count_file_server_hits;
//! # use chirpy_server::api::AppState;
//! # let state: AppState = unimplemented!();
//!
//! let files: Router<AppState> = Router::new()
//!     .nest_service("/app", ServeDir::new("./app"))
//!     .layer(middleware::from_fn_with_state(state.clone(), count_file_server_hits));
//! # let _ = files;
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::Ordering;

use super::AppState;

/// Count every request that reaches the file server, hit or miss.
///
/// The counter lives in [`AppState::file_server_hits`] and is read by
/// `/admin/metrics` and zeroed by `/admin/reset`.
pub async fn count_file_server_hits(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.file_server_hits.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}
