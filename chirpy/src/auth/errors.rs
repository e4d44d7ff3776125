//! Authentication error types.
//!
//! Each building block of the auth core has its own narrow error so callers can
//! match on exactly the outcomes that component can produce. [`AuthError`] is
//! the orchestrator-level taxonomy handed to the HTTP boundary.

use thiserror::Error;

use crate::db::StoreError;

/// Credential hasher failures.
///
/// A wrong password is not an error; see [`super::password::PasswordCheck`].
#[derive(Debug, Error)]
pub enum HashingError {
    /// Hash computation failed (e.g. entropy source unavailable)
    #[error("Password hashing failed: {0}")]
    Failed(String),

    /// The stored hash could not be parsed
    #[error("Stored password hash is malformed")]
    MalformedHash,
}

/// Access token codec failures
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature does not match the verifying secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Current time is at or past `exp`
    #[error("Token expired")]
    Expired,

    /// Token could not be parsed or is missing required claims
    #[error("Malformed token")]
    Malformed,

    /// Issuer claim does not match
    #[error("Token issuer mismatch")]
    WrongIssuer,

    /// Requested lifetime was zero or negative
    #[error("Token lifetime must be positive")]
    InvalidTtl,

    /// Signing failed
    #[error("Token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Refresh token store adapter failures
#[derive(Debug, Error)]
pub enum RefreshTokenError {
    /// No record for this token value
    #[error("Refresh token not found")]
    NotFound,

    /// Record exists but its window has elapsed
    #[error("Refresh token expired")]
    Expired,

    /// Record was revoked
    #[error("Refresh token revoked")]
    Revoked,

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Credential extraction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The authorization header is absent
    #[error("No authorization header found")]
    MissingHeader,

    /// The header is present but does not carry the expected scheme
    #[error("Malformed authorization header")]
    MalformedHeader,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Access token missing the mark: bad signature, expired, malformed, foreign issuer
    #[error("Invalid access token")]
    Unauthorized(#[source] TokenError),

    /// Valid principal acting on a resource it does not own
    #[error("Forbidden")]
    Forbidden,

    /// Refresh token unknown
    #[error("Refresh token not found")]
    TokenNotFound,

    /// Refresh token past its window
    #[error("Refresh token expired")]
    TokenExpired,

    /// Refresh token revoked
    #[error("Refresh token revoked")]
    TokenRevoked,

    /// Authorization header absent
    #[error("No authorization header found")]
    MissingHeader,

    /// Authorization header present but unusable
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Service API key did not match
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Password hashing or stored-hash parsing failed
    #[error(transparent)]
    Hashing(#[from] HashingError),

    /// Access token could not be minted
    #[error("Failed to issue access token")]
    TokenIssue(#[source] TokenError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Email already registered
    #[error("Email already exists")]
    EmailTaken,

    /// Email rejected by validation
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected by validation
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// User record does not exist
    #[error("User not found")]
    UserNotFound,
}

impl From<HeaderError> for AuthError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::MissingHeader => AuthError::MissingHeader,
            HeaderError::MalformedHeader => AuthError::MalformedHeader,
        }
    }
}

impl From<RefreshTokenError> for AuthError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::NotFound => AuthError::TokenNotFound,
            RefreshTokenError::Expired => AuthError::TokenExpired,
            RefreshTokenError::Revoked => AuthError::TokenRevoked,
            RefreshTokenError::Store(e) => AuthError::Store(e),
        }
    }
}

impl AuthError {
    /// HTTP status the boundary should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthorized(_)
            | AuthError::TokenNotFound
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::InvalidApiKey => 401,
            AuthError::Forbidden => 403,
            AuthError::UserNotFound => 404,
            AuthError::EmailTaken => 409,
            AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => 400,
            AuthError::Hashing(_) | AuthError::TokenIssue(_) | AuthError::Store(_) => 500,
        }
    }

    /// True for every failure that should be reported as "not authenticated"
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == 401
    }

    /// True when the failure is a server-side fault rather than bad input
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Internal faults are collapsed to a generic message, and all refresh
    /// token failures read the same so token validity cannot be probed.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Hashing(_) | AuthError::TokenIssue(_) | AuthError::Store(_) => {
                "Internal server error".to_string()
            }
            AuthError::TokenNotFound | AuthError::TokenExpired | AuthError::TokenRevoked => {
                "Invalid refresh token".to_string()
            }
            AuthError::Unauthorized(_) => "Invalid token".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_failures_map_to_unauthorized() {
        for err in [
            RefreshTokenError::NotFound,
            RefreshTokenError::Expired,
            RefreshTokenError::Revoked,
        ] {
            let auth: AuthError = err.into();
            assert_eq!(auth.status_code(), 401);
            assert_eq!(auth.client_message(), "Invalid refresh token");
        }
    }

    #[test]
    fn test_forbidden_is_distinct_from_unauthorized() {
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert!(!AuthError::Forbidden.is_unauthorized());
        assert!(AuthError::Unauthorized(TokenError::Expired).is_unauthorized());
    }

    #[test]
    fn test_internal_faults_are_sanitized() {
        let err = AuthError::Hashing(HashingError::MalformedHash);
        assert!(err.is_internal());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AuthError::Store(StoreError::Corrupt("bad row".to_string()));
        assert_eq!(err.status_code(), 500);
        assert!(!err.client_message().contains("bad row"));
    }

    #[test]
    fn test_header_errors_convert() {
        assert!(matches!(
            AuthError::from(HeaderError::MissingHeader),
            AuthError::MissingHeader
        ));
        assert!(matches!(
            AuthError::from(HeaderError::MalformedHeader),
            AuthError::MalformedHeader
        ));
    }
}
