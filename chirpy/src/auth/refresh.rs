//! Refresh token store adapter.
//!
//! Refresh tokens are opaque random strings whose state (owner, window,
//! revocation) lives in a [`RefreshTokenRepository`]. A record is only ever
//! mutated by revocation.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::sync::Arc;

use super::{errors::RefreshTokenError, models::UserId};
use crate::db::RefreshTokenRepository;

/// Random bytes per token (hex encoded to twice as many characters)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Result of a revoke call that found the token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// This call revoked the token
    Revoked,
    /// The token had already been revoked; its original timestamp is kept
    AlreadyRevoked,
}

/// Issues, resolves and revokes refresh tokens
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, lifetime: Duration) -> Self {
        Self {
            repository,
            lifetime,
        }
    }

    /// Fresh 256-bit token, hex encoded
    pub fn generate_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Issue and persist a new token for `user_id`
    pub async fn issue(&self, user_id: UserId) -> Result<String, RefreshTokenError> {
        let token = Self::generate_token();
        let expires_at = Utc::now() + self.lifetime;
        self.repository.create(&token, user_id, expires_at).await?;
        Ok(token)
    }

    /// Resolve a token to its owner
    pub async fn resolve(&self, token: &str) -> Result<UserId, RefreshTokenError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// * `RefreshTokenError::NotFound` - No record for this value
    /// * `RefreshTokenError::Revoked` - Record revoked (checked before expiry)
    /// * `RefreshTokenError::Expired` - `now` is at or past `expires_at`
    pub async fn resolve_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, RefreshTokenError> {
        let record = self
            .repository
            .find(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        if record.is_revoked() {
            return Err(RefreshTokenError::Revoked);
        }
        if record.is_expired_at(now) {
            return Err(RefreshTokenError::Expired);
        }

        Ok(record.user_id)
    }

    /// Revoke a token
    ///
    /// Revoking twice is not an error. An unknown token is reported as
    /// `RefreshTokenError::NotFound` so the caller can pick its own policy.
    pub async fn revoke(&self, token: &str) -> Result<RevokeOutcome, RefreshTokenError> {
        if self.repository.revoke(token, Utc::now()).await? {
            return Ok(RevokeOutcome::Revoked);
        }

        match self.repository.find(token).await? {
            Some(_) => Ok(RevokeOutcome::AlreadyRevoked),
            None => Err(RefreshTokenError::NotFound),
        }
    }

    /// Revoke every live token of a user; returns how many were revoked
    pub async fn revoke_all(&self, user_id: UserId) -> Result<u64, RefreshTokenError> {
        Ok(self
            .repository
            .revoke_all_for_user(user_id, Utc::now())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RefreshTokenRecord;
    use crate::db::MemoryRefreshTokenRepository;
    use uuid::Uuid;

    fn store() -> (RefreshTokenStore, MemoryRefreshTokenRepository) {
        let repo = MemoryRefreshTokenRepository::new();
        let store = RefreshTokenStore::new(Arc::new(repo.clone()), Duration::days(60));
        (store, repo)
    }

    #[test]
    fn test_generated_tokens_are_long_and_distinct() {
        let a = RefreshTokenStore::generate_token();
        let b = RefreshTokenStore::generate_token();
        assert_eq!(a.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_issue_then_resolve() {
        let (store, repo) = store();
        let user_id = Uuid::new_v4();
        let token = store.issue(user_id).await.unwrap();

        assert_eq!(store.resolve(&token).await.unwrap(), user_id);

        let record = repo.find(&token).await.unwrap().unwrap();
        let window = record.expires_at - record.created_at;
        assert!((window - Duration::days(60)).num_seconds().abs() <= 1);
        assert!(record.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_resolve_unknown() {
        let (store, _) = store();
        assert!(matches!(
            store.resolve("nope").await,
            Err(RefreshTokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_resolve_after_window() {
        let (store, _) = store();
        let token = store.issue(Uuid::new_v4()).await.unwrap();
        let later = Utc::now() + Duration::days(61);
        assert!(matches!(
            store.resolve_at(&token, later).await,
            Err(RefreshTokenError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (store, repo) = store();
        let token = store.issue(Uuid::new_v4()).await.unwrap();

        assert_eq!(store.revoke(&token).await.unwrap(), RevokeOutcome::Revoked);
        let first = repo.find(&token).await.unwrap().unwrap().revoked_at;

        assert_eq!(
            store.revoke(&token).await.unwrap(),
            RevokeOutcome::AlreadyRevoked
        );
        let second = repo.find(&token).await.unwrap().unwrap().revoked_at;
        assert_eq!(first, second);

        assert!(matches!(
            store.resolve(&token).await,
            Err(RefreshTokenError::Revoked)
        ));
    }

    #[tokio::test]
    async fn test_revoke_unknown_reports_not_found() {
        let (store, _) = store();
        assert!(matches!(
            store.revoke("missing").await,
            Err(RefreshTokenError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_revoked_wins_over_expired() {
        let (store, repo) = store();
        let past = Utc::now() - Duration::days(90);
        repo.insert_record(RefreshTokenRecord {
            token: "old".to_string(),
            user_id: Uuid::new_v4(),
            created_at: past,
            updated_at: past,
            expires_at: past + Duration::days(60),
            revoked_at: Some(past + Duration::days(1)),
        })
        .await;

        assert!(matches!(
            store.resolve("old").await,
            Err(RefreshTokenError::Revoked)
        ));
    }
}
