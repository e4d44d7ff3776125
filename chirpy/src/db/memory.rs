//! In-memory repository implementations.
//!
//! Used by tests and by the server when it runs without a database. Each
//! repository guards its records with a single lock, so every operation is
//! atomic per record just like the PostgreSQL point queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{ChirpRepository, RefreshTokenRepository, UserRepository};
use crate::auth::{RefreshTokenRecord, User, UserId};
use crate::chirps::{Chirp, ChirpId};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory `UserRepository`
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, StoredUser>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored hash for an email (test helper for corrupt data)
    pub async fn set_password_hash(&self, email: &str, password_hash: &str) -> bool {
        let mut users = self.users.write().await;
        match users.values_mut().find(|u| u.user.email == email) {
            Some(stored) => {
                stored.password_hash = password_hash.to_string();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.user.email == email) {
            return Err(StoreError::Conflict("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            is_chirpy_red: false,
        };
        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(user)
    }

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn password_hash_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user.email == email)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.user.email == email && u.user.id != user_id)
        {
            return Err(StoreError::Conflict("email".to_string()));
        }

        Ok(users.get_mut(&user_id).map(|stored| {
            stored.user.email = email.to_string();
            stored.user.updated_at = Utc::now();
            stored.password_hash = password_hash.to_string();
            stored.user.clone()
        }))
    }

    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&user_id) {
            Some(stored) => {
                stored.user.is_chirpy_red = true;
                stored.user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn clear(&self) -> StoreResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}

/// In-memory `RefreshTokenRepository`
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl MemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record verbatim (test helper for back-dated tokens)
    pub async fn insert_record(&self, record: RefreshTokenRecord) {
        self.tokens
            .write()
            .await
            .insert(record.token.clone(), record);
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn create(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshTokenRecord> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(token) {
            return Err(StoreError::Conflict("refresh token".to_string()));
        }

        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tokens.insert(token.to_string(), record.clone());

        Ok(record)
    }

    async fn find(&self, token: &str) -> StoreResult<Option<RefreshTokenRecord>> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut tokens = self.tokens.write().await;
        Ok(match tokens.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(at);
                record.updated_at = at;
                true
            }
            _ => false,
        })
    }

    async fn revoke_all_for_user(&self, user_id: UserId, at: DateTime<Utc>) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for record in tokens
            .values_mut()
            .filter(|r| r.user_id == user_id && r.revoked_at.is_none())
        {
            record.revoked_at = Some(at);
            record.updated_at = at;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.tokens.write().await.clear();
        Ok(())
    }
}

/// In-memory `ChirpRepository`
#[derive(Debug, Clone, Default)]
pub struct MemoryChirpRepository {
    // Insertion order doubles as creation order.
    chirps: Arc<RwLock<Vec<Chirp>>>,
}

impl MemoryChirpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChirpRepository for MemoryChirpRepository {
    async fn create(&self, body: &str, user_id: UserId) -> StoreResult<Chirp> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        self.chirps.write().await.push(chirp.clone());
        Ok(chirp)
    }

    async fn list(&self, author: Option<UserId>) -> StoreResult<Vec<Chirp>> {
        Ok(self
            .chirps
            .read()
            .await
            .iter()
            .filter(|c| author.is_none_or(|id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, chirp_id: ChirpId) -> StoreResult<Option<Chirp>> {
        Ok(self
            .chirps
            .read()
            .await
            .iter()
            .find(|c| c.id == chirp_id)
            .cloned())
    }

    async fn delete(&self, chirp_id: ChirpId) -> StoreResult<bool> {
        let mut chirps = self.chirps.write().await;
        let before = chirps.len();
        chirps.retain(|c| c.id != chirp_id);
        Ok(chirps.len() != before)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.chirps.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let repo = MemoryUserRepository::new();
        repo.create_user("a@example.com", "hash").await.unwrap();

        let result = repo.create_user("a@example.com", "hash2").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_user_and_hash() {
        let repo = MemoryUserRepository::new();
        let user = repo.create_user("a@example.com", "hash").await.unwrap();

        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_email("a@example.com").await.unwrap(),
            Some(user)
        );
        assert_eq!(
            repo.password_hash_by_email("a@example.com").await.unwrap(),
            Some("hash".to_string())
        );
        assert!(repo.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_credentials_conflict() {
        let repo = MemoryUserRepository::new();
        let alice = repo.create_user("alice@example.com", "h1").await.unwrap();
        repo.create_user("bob@example.com", "h2").await.unwrap();

        let result = repo
            .update_credentials(alice.id, "bob@example.com", "h3")
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let updated = repo
            .update_credentials(alice.id, "alice@example.com", "h3")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "alice@example.com");
        assert_eq!(
            repo.password_hash_by_email("alice@example.com")
                .await
                .unwrap()
                .as_deref(),
            Some("h3")
        );
    }

    #[tokio::test]
    async fn test_revoke_only_once() {
        let repo = MemoryRefreshTokenRepository::new();
        let user_id = Uuid::new_v4();
        repo.create("tok", user_id, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let first_at = Utc::now();
        assert!(repo.revoke("tok", first_at).await.unwrap());
        assert!(!repo.revoke("tok", first_at + Duration::seconds(5)).await.unwrap());
        assert!(!repo.revoke("missing", first_at).await.unwrap());

        let record = repo.find("tok").await.unwrap().unwrap();
        assert_eq!(record.revoked_at, Some(first_at));
    }

    #[tokio::test]
    async fn test_revoke_all_for_user() {
        let repo = MemoryRefreshTokenRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let expires = Utc::now() + Duration::days(1);
        repo.create("a1", alice, expires).await.unwrap();
        repo.create("a2", alice, expires).await.unwrap();
        repo.create("b1", bob, expires).await.unwrap();

        assert_eq!(repo.revoke_all_for_user(alice, Utc::now()).await.unwrap(), 2);
        assert!(repo.find("a1").await.unwrap().unwrap().is_revoked());
        assert!(!repo.find("b1").await.unwrap().unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_chirps_keep_creation_order() {
        let repo = MemoryChirpRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let first = repo.create("first", alice).await.unwrap();
        repo.create("second", bob).await.unwrap();
        let third = repo.create("third", alice).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].body, "first");

        let by_alice = repo.list(Some(alice)).await.unwrap();
        assert_eq!(
            by_alice.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![first.id, third.id]
        );

        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());
        assert!(repo.find_by_id(first.id).await.unwrap().is_none());
    }
}
