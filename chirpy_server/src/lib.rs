//! # Chirpy server
//!
//! The HTTP layer in front of the [`chirpy`] core: axum routes, JSON
//! payloads, status-code mapping, configuration, logging and metrics.
//!
//! The binary in `main.rs` wires these together; integration tests build the
//! router directly with [`api::AppState::new`] over in-memory repositories.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
