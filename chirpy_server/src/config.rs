//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use chirpy::db::DatabaseConfig;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default directory served under `/app`
pub const DEFAULT_FILESERVER_ROOT: &str = "./app";

/// Platform name that unlocks `/admin/reset`
pub const DEV_PLATFORM: &str = "dev";

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; `None` runs on in-memory storage
    pub database: Option<DatabaseConfig>,
    /// Security configuration
    pub security: SecurityConfig,
    /// Deployment platform (`dev` enables destructive admin routes)
    pub platform: String,
    /// Directory served under `/app`
    pub fileserver_root: PathBuf,
    /// Prometheus exporter address, if enabled
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// API key the payment provider presents on webhooks (required)
    pub polka_key: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
        )
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr(
                "SERVER_BIND",
                &lookup("SERVER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            )?,
        };

        let database = database_url_override
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig::with_url(url).with_env_overrides());

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -base64 64".to_string(),
        })?;

        let polka_key = lookup("POLKA_KEY").ok_or_else(|| ConfigError::MissingRequired {
            var: "POLKA_KEY".to_string(),
            hint: "Copy the API key from the Polka dashboard".to_string(),
        })?;

        let metrics_bind = lookup("METRICS_BIND")
            .map(|addr| parse_addr("METRICS_BIND", &addr))
            .transpose()?;

        Ok(ServerConfig {
            bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                polka_key,
            },
            platform: lookup("PLATFORM").unwrap_or_default(),
            fileserver_root: lookup("FILESERVER_ROOT")
                .unwrap_or_else(|| DEFAULT_FILESERVER_ROOT.to_string())
                .into(),
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        if self.security.polka_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "POLKA_KEY".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Whether destructive development routes are enabled
    pub fn is_dev(&self) -> bool {
        self.platform == DEV_PLATFORM
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_addr(var: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("'{value}' is not a valid IP:PORT address"),
    })
}
