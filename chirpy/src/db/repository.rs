//! Repository trait definitions for testability and dependency injection.
//!
//! This module provides trait-based abstractions over database operations.
//! The auth core only ever talks to these traits; PostgreSQL implementations
//! live here and in-memory ones in [`super::memory`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::auth::{RefreshTokenRecord, User, UserId};
use crate::chirps::{Chirp, ChirpId};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; `StoreError::Conflict` if the email is taken
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Stored password hash for an email
    async fn password_hash_by_email(&self, email: &str) -> StoreResult<Option<String>>;

    /// Replace email and password hash; `None` if the user does not exist
    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>>;

    /// Flag the user as Chirpy Red; `false` if the user does not exist
    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> StoreResult<bool>;

    /// Delete every user
    async fn clear(&self) -> StoreResult<()>;
}

/// Trait for refresh token repository operations
///
/// Every method is a single-record point operation keyed by the unique token
/// string, except `revoke_all_for_user` and `clear`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new, unrevoked token
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshTokenRecord>;

    /// Find token by exact value
    async fn find(&self, token: &str) -> StoreResult<Option<RefreshTokenRecord>>;

    /// Set `revoked_at = at` if the token exists and is not yet revoked.
    ///
    /// Returns `true` only when this call performed the revocation.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Revoke every live token owned by `user_id`; returns how many changed
    async fn revoke_all_for_user(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<u64>;

    /// Delete every token
    async fn clear(&self) -> StoreResult<()>;
}

/// Trait for chirp repository operations
#[async_trait]
pub trait ChirpRepository: Send + Sync {
    /// Create a chirp
    async fn create(&self, body: &str, user_id: UserId) -> StoreResult<Chirp>;

    /// All chirps (optionally by one author), oldest first
    async fn list(&self, author: Option<UserId>) -> StoreResult<Vec<Chirp>>;

    /// Find chirp by ID
    async fn find_by_id(&self, chirp_id: ChirpId) -> StoreResult<Option<Chirp>>;

    /// Delete chirp; `false` if it did not exist
    async fn delete(&self, chirp_id: ChirpId) -> StoreResult<bool>;

    /// Delete every chirp
    async fn clear(&self) -> StoreResult<()>;
}

fn timestamp(row: &PgRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    Ok(row.try_get::<NaiveDateTime, _>(column)?.and_utc())
}

fn user_from_row(r: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: r.try_get("id")?,
        created_at: timestamp(r, "created_at")?,
        updated_at: timestamp(r, "updated_at")?,
        email: r.try_get("email")?,
        is_chirpy_red: r.try_get("is_chirpy_red")?,
    })
}

fn refresh_token_from_row(r: &PgRow) -> Result<RefreshTokenRecord, sqlx::Error> {
    Ok(RefreshTokenRecord {
        token: r.try_get("token")?,
        user_id: r.try_get("user_id")?,
        created_at: timestamp(r, "created_at")?,
        updated_at: timestamp(r, "updated_at")?,
        expires_at: timestamp(r, "expires_at")?,
        revoked_at: r
            .try_get::<Option<NaiveDateTime>, _>("revoked_at")?
            .map(|dt| dt.and_utc()),
    })
}

fn chirp_from_row(r: &PgRow) -> Result<Chirp, sqlx::Error> {
    Ok(Chirp {
        id: r.try_get("id")?,
        created_at: timestamp(r, "created_at")?,
        updated_at: timestamp(r, "updated_at")?,
        body: r.try_get("body")?,
        user_id: r.try_get("user_id")?,
    })
}

const USER_COLUMNS: &str = "id, created_at, updated_at, email, is_chirpy_red";
const REFRESH_TOKEN_COLUMNS: &str = "token, user_id, created_at, updated_at, expires_at, revoked_at";
const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, created_at, updated_at, email, hashed_password)
             VALUES ($1, $2, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "email"))?;

        Ok(user_from_row(&row)?)
    }

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn password_hash_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        let row = sqlx::query("SELECT hashed_password FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|r| r.try_get::<String, _>("hashed_password"))
            .transpose()?)
    }

    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET email = $2, hashed_password = $3, updated_at = $4
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now().naive_utc())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "email"))?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = TRUE, updated_at = $2 WHERE id = $1",
        )
        .bind(user_id)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

/// Default PostgreSQL implementation of `RefreshTokenRepository`
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshTokenRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at)
             VALUES ($1, $2, $2, $3, $4)
             RETURNING {REFRESH_TOKEN_COLUMNS}"
        ))
        .bind(token)
        .bind(Utc::now().naive_utc())
        .bind(user_id)
        .bind(expires_at.naive_utc())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "refresh token"))?;

        Ok(refresh_token_from_row(&row)?)
    }

    async fn find(&self, token: &str) -> StoreResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(refresh_token_from_row).transpose()?)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, updated_at = $2
             WHERE token = $1 AND revoked_at IS NULL",
        )
        .bind(token)
        .bind(at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, updated_at = $2
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM refresh_tokens")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Default PostgreSQL implementation of `ChirpRepository`
pub struct PgChirpRepository {
    pool: PgPool,
}

impl PgChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChirpRepository for PgChirpRepository {
    async fn create(&self, body: &str, user_id: UserId) -> StoreResult<Chirp> {
        let row = sqlx::query(&format!(
            "INSERT INTO chirps (id, created_at, updated_at, body, user_id)
             VALUES ($1, $2, $2, $3, $4)
             RETURNING {CHIRP_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(Utc::now().naive_utc())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp_from_row(&row)?)
    }

    async fn list(&self, author: Option<UserId>) -> StoreResult<Vec<Chirp>> {
        let rows = match author {
            Some(user_id) => {
                sqlx::query(&format!(
                    "SELECT {CHIRP_COLUMNS} FROM chirps WHERE user_id = $1 ORDER BY created_at ASC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {CHIRP_COLUMNS} FROM chirps ORDER BY created_at ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .iter()
            .map(chirp_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_by_id(&self, chirp_id: ChirpId) -> StoreResult<Option<Chirp>> {
        let row = sqlx::query(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
            .bind(chirp_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(chirp_from_row).transpose()?)
    }

    async fn delete(&self, chirp_id: ChirpId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(chirp_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM chirps").execute(&self.pool).await?;
        Ok(())
    }
}
