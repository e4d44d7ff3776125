//! Structured logging configuration.
//!
//! The core library logs through the `log` facade; the subscriber installed
//! here forwards those records into `tracing` so both end up in one stream.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use chirpy_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// Never pass credentials or raw tokens in `message`.
///
/// # Example
///
/// ```
/// use chirpy_server::logging::log_security_event;
///
/// log_security_event("failed_login", None, "Invalid email or password");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<Uuid>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id.map(|id| id.to_string()),
        "SECURITY: {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some(Uuid::new_v4()), "Test message");
        log_security_event("test_event", None, "Anonymous");
    }

    #[test]
    fn test_default_filter_parses() {
        EnvFilter::try_new(DEFAULT_FILTER).unwrap();
    }
}
