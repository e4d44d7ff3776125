//! Chirp manager implementation.

use http::HeaderMap;
use log::info;
use std::sync::Arc;

use super::{
    errors::{ChirpError, ChirpResult},
    models::{Chirp, ChirpId, MAX_CHIRP_LENGTH, SortOrder},
};
use crate::auth::{AuthManager, UserId};
use crate::db::ChirpRepository;

/// Chirp manager
#[derive(Clone)]
pub struct ChirpManager {
    chirps: Arc<dyn ChirpRepository>,
    auth: Arc<AuthManager>,
}

impl ChirpManager {
    pub fn new(chirps: Arc<dyn ChirpRepository>, auth: Arc<AuthManager>) -> Self {
        Self { chirps, auth }
    }

    /// Post a chirp as the user behind the bearer access token
    ///
    /// # Errors
    ///
    /// * `ChirpError::Auth` - Missing or invalid access token
    /// * `ChirpError::Empty` / `ChirpError::TooLong` - Body rejected
    pub async fn create(&self, headers: &HeaderMap, body: &str) -> ChirpResult<Chirp> {
        let author = self.auth.authenticate(headers)?;
        validate_body(body)?;

        let chirp = self.chirps.create(body, author).await?;
        info!("User {author} posted chirp {}", chirp.id);
        Ok(chirp)
    }

    /// List chirps, optionally restricted to one author
    pub async fn list(&self, author: Option<UserId>, sort: SortOrder) -> ChirpResult<Vec<Chirp>> {
        let mut chirps = self.chirps.list(author).await?;
        if sort == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    /// Fetch a single chirp
    pub async fn get(&self, chirp_id: ChirpId) -> ChirpResult<Chirp> {
        self.chirps
            .find_by_id(chirp_id)
            .await?
            .ok_or(ChirpError::NotFound)
    }

    /// Delete a chirp owned by the user behind the bearer access token
    ///
    /// Authentication is checked before existence, ownership after.
    ///
    /// # Errors
    ///
    /// * `ChirpError::Auth(AuthError::Unauthorized)` (or a header error) - No valid token
    /// * `ChirpError::NotFound` - No such chirp
    /// * `ChirpError::Auth(AuthError::Forbidden)` - Chirp belongs to someone else
    pub async fn delete(&self, headers: &HeaderMap, chirp_id: ChirpId) -> ChirpResult<()> {
        let principal = self.auth.authenticate(headers)?;
        let chirp = self.get(chirp_id).await?;
        self.auth.ensure_owner(principal, chirp.user_id)?;

        // Lost a race with another delete of the same chirp.
        if !self.chirps.delete(chirp_id).await? {
            return Err(ChirpError::NotFound);
        }

        info!("User {principal} deleted chirp {chirp_id}");
        Ok(())
    }
}

fn validate_body(body: &str) -> ChirpResult<()> {
    if body.trim().is_empty() {
        return Err(ChirpError::Empty);
    }
    let length = body.chars().count();
    if length > MAX_CHIRP_LENGTH {
        return Err(ChirpError::TooLong { length });
    }
    Ok(())
}
