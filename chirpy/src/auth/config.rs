//! Authentication configuration.

use chrono::Duration;

/// Default (and maximum) access token lifetime in seconds
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Refresh token lifetime in days
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Immutable auth settings, built once at startup and owned by the
/// [`super::AuthManager`]
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub token_secret: String,
    /// Shared key expected from the payment provider's webhooks
    pub api_key: String,
    /// Default and upper bound for access token lifetime
    pub access_token_ttl: Duration,
    /// Fixed refresh token window
    pub refresh_token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(token_secret: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            api_key: api_key.into(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
        }
    }

    /// Lifetime to grant for a caller-requested number of seconds
    ///
    /// Values in `(0, max]` are honoured, larger ones are clamped to the
    /// maximum, and missing or non-positive ones get the default.
    pub fn access_ttl_for(&self, requested_secs: Option<i64>) -> Duration {
        match requested_secs {
            Some(secs) if secs > 0 => {
                Duration::seconds(secs.min(self.access_token_ttl.num_seconds()))
            }
            _ => self.access_token_ttl,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_ttl_policy() {
        let config = AuthConfig::new("secret", "key");
        assert_eq!(config.access_ttl_for(None), Duration::seconds(3600));
        assert_eq!(config.access_ttl_for(Some(60)), Duration::seconds(60));
        assert_eq!(config.access_ttl_for(Some(3600)), Duration::seconds(3600));
        assert_eq!(config.access_ttl_for(Some(7200)), Duration::seconds(3600));
        assert_eq!(config.access_ttl_for(Some(0)), Duration::seconds(3600));
        assert_eq!(config.access_ttl_for(Some(-10)), Duration::seconds(3600));
        assert_eq!(config.access_ttl_for(Some(i64::MAX)), Duration::seconds(3600));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::new("super-secret", "polka-key");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("polka-key"));
    }
}
