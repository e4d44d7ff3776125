//! HTTP API for the Chirpy server.
//!
//! # Modules
//!
//! - [`users`]: Account creation and credential changes
//! - [`auth`]: Login, refresh and revoke
//! - [`chirps`]: Posting, listing and deleting chirps
//! - [`webhooks`]: Payment provider callbacks
//! - [`admin`]: Visit counter and development reset
//! - [`middleware`]: Static file hit counting
//! - [`request_id`]: Request correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /api/healthz               - Liveness probe (public)
//! POST   /api/users                 - Register (public)
//! PUT    /api/users                 - Change email and password (access token)
//! POST   /api/login                 - Login (public)
//! POST   /api/refresh               - New access token (refresh token)
//! POST   /api/revoke                - Revoke refresh token (refresh token)
//! POST   /api/chirps                - Post a chirp (access token)
//! GET    /api/chirps                - List chirps, ?author_id=&sort=asc|desc (public)
//! GET    /api/chirps/{chirp_id}     - Get a chirp (public)
//! DELETE /api/chirps/{chirp_id}     - Delete own chirp (access token)
//! POST   /api/polka/webhooks        - Premium upgrade (API key)
//! GET    /admin/metrics             - Visit counter page
//! POST   /admin/reset               - Wipe all data (dev platform only)
//! GET    /app/*                     - Static files
//! ```
//!
//! # Errors
//!
//! Every failure answers with `{"error": "<message>"}`. Messages come from
//! the core's `client_message()`, which collapses internal faults and makes
//! every refresh token failure read the same.
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod middleware;
pub mod request_id;
pub mod users;
pub mod webhooks;

use axum::{
    Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chirpy::{
    AuthConfig, AuthError, AuthManager, ChirpError, ChirpManager, Repositories,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub chirp_manager: Arc<ChirpManager>,
    pub repositories: Repositories,
    /// Requests served under `/app` since start or last reset
    pub file_server_hits: Arc<AtomicU64>,
    /// Deployment platform; `dev` unlocks `/admin/reset`
    pub platform: String,
    pub fileserver_root: PathBuf,
}

impl AppState {
    /// Wire the managers over one set of repositories
    pub fn new(
        repositories: Repositories,
        auth_config: AuthConfig,
        platform: impl Into<String>,
        fileserver_root: impl Into<PathBuf>,
    ) -> Self {
        let auth_manager = Arc::new(AuthManager::new(
            repositories.users.clone(),
            repositories.refresh_tokens.clone(),
            auth_config,
        ));
        let chirp_manager = Arc::new(ChirpManager::new(
            repositories.chirps.clone(),
            auth_manager.clone(),
        ));

        Self {
            auth_manager,
            chirp_manager,
            repositories,
            file_server_hits: Arc::new(AtomicU64::new(0)),
            platform: platform.into(),
            fileserver_root: fileserver_root.into(),
        }
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection type shared by the handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response from a status and message
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Message for any body that is not the expected JSON document
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Unwrap a JSON body, answering `400` with the usual error shape when
/// axum could not decode it
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected request body");
            Err(error_response(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE))
        }
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Map an auth failure to its status and client-safe message
pub fn auth_error(err: AuthError) -> ApiError {
    if err.is_internal() {
        tracing::error!(error = %err, "Auth operation failed");
    }
    error_response(status_from(err.status_code()), err.client_message())
}

/// Map a chirp failure to its status and client-safe message
pub fn chirp_error(err: ChirpError) -> ApiError {
    if err.status_code() >= 500 {
        tracing::error!(error = %err, "Chirp operation failed");
    }
    error_response(status_from(err.status_code()), err.client_message())
}

/// Create the complete router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use chirpy_server::api::{create_router, AppState};
/// # use chirpy::{AuthConfig, Repositories};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let state = AppState::new(
///     Repositories::in_memory(),
///     AuthConfig::new("a-signing-secret-of-reasonable-length", "polka-key"),
///     "dev",
///     "./app",
/// );
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/healthz", get(health_check))
        .route("/users", post(users::create_user).put(users::update_user))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
        .route(
            "/chirps",
            post(chirps::create_chirp).get(chirps::list_chirps),
        )
        .route(
            "/chirps/{chirp_id}",
            get(chirps::get_chirp).delete(chirps::delete_chirp),
        )
        .route("/polka/webhooks", post(webhooks::polka_webhook));

    let admin_routes = Router::new()
        .route("/metrics", get(admin::metrics))
        .route("/reset", post(admin::reset));

    let app_files = Router::new()
        .nest_service("/app", ServeDir::new(&state.fileserver_root))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::count_file_server_hits,
        ));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .merge(app_files)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id::request_id_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Liveness probe.
///
/// ```bash
/// curl http://localhost:8080/api/healthz
/// # OK
/// ```
async fn health_check() -> &'static str {
    "OK"
}
