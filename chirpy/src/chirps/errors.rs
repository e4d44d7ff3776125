//! Chirp error types.

use thiserror::Error;

use super::models::MAX_CHIRP_LENGTH;
use crate::auth::AuthError;
use crate::db::StoreError;

/// Chirp errors
#[derive(Debug, Error)]
pub enum ChirpError {
    /// Body exceeds the length limit
    #[error("Chirp is too long: {length} characters (max {max})", max = MAX_CHIRP_LENGTH)]
    TooLong { length: usize },

    /// Body is empty or whitespace
    #[error("Chirp must not be empty")]
    Empty,

    /// No chirp with that ID
    #[error("Chirp not found")]
    NotFound,

    /// Authentication or ownership failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChirpError {
    /// HTTP status the boundary should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ChirpError::TooLong { .. } | ChirpError::Empty => 400,
            ChirpError::NotFound => 404,
            ChirpError::Auth(e) => e.status_code(),
            ChirpError::Store(_) => 500,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            ChirpError::Auth(e) => e.client_message(),
            ChirpError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for chirp operations
pub type ChirpResult<T> = Result<T, ChirpError>;
