//! Database module providing PostgreSQL connection pooling and the repository seam.
//!
//! The auth core never issues SQL itself; it goes through the repository
//! traits in [`repository`]. [`Repositories`] bundles one implementation of
//! each so the rest of the system can be wired against PostgreSQL or against
//! the in-memory store in [`memory`].

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryChirpRepository, MemoryRefreshTokenRepository, MemoryUserRepository};
pub use repository::{
    ChirpRepository, PgChirpRepository, PgRefreshTokenRepository, PgUserRepository,
    RefreshTokenRepository, UserRepository,
};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chirpy::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env().unwrap_or_default();
    ///     let db = Database::new(&config).await?;
    ///     db.run_migrations().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Apply the bundled schema migrations
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// One implementation of every repository, shared behind `Arc`s
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(db: &Database) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.pool().clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(db.pool().clone())),
            chirps: Arc::new(PgChirpRepository::new(db.pool().clone())),
        }
    }

    /// Fresh, empty in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            refresh_tokens: Arc::new(MemoryRefreshTokenRepository::new()),
            chirps: Arc::new(MemoryChirpRepository::new()),
        }
    }

    /// Delete all chirps, refresh tokens and users
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.chirps.clear().await?;
        self.refresh_tokens.clear().await?;
        self.users.clear().await
    }
}
