//! Authentication module providing credential hashing, access tokens,
//! refresh tokens and the session flows built on them.
//!
//! This module implements a two-tier trust model:
//! - Argon2id password hashing with a per-call random salt
//! - Stateless HS256 JWT access tokens (1-hour maximum lifetime), verified
//!   without touching the store and therefore not revocable
//! - Opaque, store-backed refresh tokens (60-day window) that can be revoked
//! - A static API key for service-to-service webhooks
//!
//! ## Example
//!
//! ```no_run
//! use chirpy::auth::{AuthConfig, AuthManager, LoginRequest};
//! use chirpy::db::{Database, Repositories};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let repos = Repositories::postgres(&db);
//!     let auth = AuthManager::new(
//!         repos.users.clone(),
//!         repos.refresh_tokens.clone(),
//!         AuthConfig::new("jwt_secret", "polka_key"),
//!     );
//!
//!     auth.register("walt@breakingbad.com", "04234").await?;
//!     let (user, tokens) = auth
//!         .login(LoginRequest {
//!             email: "walt@breakingbad.com".to_string(),
//!             password: "04234".to_string(),
//!             expires_in_seconds: None,
//!         })
//!         .await?;
//!     println!("{} logged in, refresh token {}", user.email, tokens.refresh_token);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod extract;
pub mod manager;
pub mod models;
pub mod password;
pub mod refresh;
pub mod token;

pub use config::AuthConfig;
pub use errors::{AuthError, AuthResult, HashingError, HeaderError, RefreshTokenError, TokenError};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, LoginRequest, RefreshTokenRecord, SessionTokens, UpdateCredentials, User,
    UserId,
};
pub use password::PasswordCheck;
pub use refresh::{RefreshTokenStore, RevokeOutcome};
