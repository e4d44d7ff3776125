//! # Chirpy
//!
//! Authentication and session core for a small social posting backend.
//!
//! The crate is organised around a two-tier trust model: short-lived,
//! stateless access tokens that are verified by signature and expiry alone,
//! and long-lived refresh tokens whose state lives in the store and can be
//! revoked. All durable state sits behind the repository traits in [`db`];
//! the signing secret and API key are plain configuration passed in once.
//!
//! ## Core Modules
//!
//! - [`auth`]: Password hashing, access token codec, refresh token store,
//!   header extraction and the [`AuthManager`] session flows
//! - [`chirps`]: Posts and ownership-checked deletion
//! - [`db`]: PostgreSQL pool, repository traits and in-memory implementations
//!
//! ## Example
//!
//! ```
//! use chirpy::{AuthConfig, AuthManager, Repositories};
//!
//! let repos = Repositories::in_memory();
//! let auth = AuthManager::new(
//!     repos.users.clone(),
//!     repos.refresh_tokens.clone(),
//!     AuthConfig::new("a-signing-secret-of-reasonable-length", "polka-key"),
//! );
//! assert_eq!(auth.config().access_token_ttl.num_seconds(), 3600);
//! ```

/// Authentication: hashing, tokens, extraction and session flows.
pub mod auth;
pub use auth::{AuthConfig, AuthError, AuthManager, AuthResult, User, UserId};

/// Chirp posting and ownership-checked deletion.
pub mod chirps;
pub use chirps::{Chirp, ChirpError, ChirpManager};

/// Storage seam.
pub mod db;
pub use db::{Database, DatabaseConfig, Repositories};
