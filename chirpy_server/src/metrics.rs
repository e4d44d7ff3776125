//! Prometheus metrics for the session lifecycle.
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! [`init_metrics`] installs the exporter, so handlers record unconditionally.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use chirpy_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment refresh exchanges counter.
pub fn token_refreshes_total(success: bool) {
    metrics::counter!("token_refreshes_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment refresh token revocations counter.
pub fn token_revocations_total() {
    metrics::counter!("token_revocations_total").increment(1);
}

/// Increment registrations counter.
pub fn users_registered_total() {
    metrics::counter!("users_registered_total").increment(1);
}

// ============================================================================
// Content & Integration Metrics
// ============================================================================

/// Increment chirps created counter.
pub fn chirps_created_total() {
    metrics::counter!("chirps_created_total").increment(1);
}

/// Record an inbound payment-provider webhook.
pub fn webhook_events_total(event: &str, handled: bool) {
    metrics::counter!("webhook_events_total",
        "event" => event.to_string(),
        "handled" => handled.to_string()
    )
    .increment(1);
}
