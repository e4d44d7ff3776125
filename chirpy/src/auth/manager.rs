//! Authentication manager implementation.
//!
//! `AuthManager` composes the hasher, the access token codec, the refresh
//! token store and the header extractors into the session flows: register,
//! login, refresh, revoke, authenticate, change credentials and ownership
//! checks.

use http::HeaderMap;
use log::{debug, info, warn};
use std::sync::Arc;

use super::{
    config::AuthConfig,
    errors::{AuthError, AuthResult, RefreshTokenError},
    extract,
    models::{LoginRequest, SessionTokens, UpdateCredentials, User, UserId},
    password::{self, PasswordCheck},
    refresh::{RefreshTokenStore, RevokeOutcome},
    token,
};
use crate::db::{RefreshTokenRepository, StoreError, UserRepository};

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    refresh_tokens: RefreshTokenStore,
    config: AuthConfig,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User repository
    /// * `refresh_tokens` - Refresh token repository
    /// * `config` - Signing secret, API key and token lifetimes
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        config: AuthConfig,
    ) -> Self {
        let refresh_tokens = RefreshTokenStore::new(refresh_tokens, config.refresh_token_ttl);
        Self {
            users,
            refresh_tokens,
            config,
        }
    }

    /// The configuration this manager was built with
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email is empty or lacks an `@`
    /// * `AuthError::WeakPassword` - Password is empty
    /// * `AuthError::EmailTaken` - Email already registered
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<User> {
        validate_email(email)?;
        validate_password(password)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password::hash_password(password)?;
        let user = self
            .users
            .create_user(email, &password_hash)
            .await
            .map_err(email_conflict)?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// # Arguments
    ///
    /// * `request` - Email, password and optional access token lifetime
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, SessionTokens)>` - Profile plus a fresh access and refresh token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// * `AuthError::Hashing` - Stored hash is unusable
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let Some(password_hash) = self.users.password_hash_by_email(&request.email).await? else {
            password::verify_placeholder(&request.password);
            warn!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if password::verify_password(&password_hash, &request.password)? == PasswordCheck::Mismatch
        {
            warn!("Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ttl = self.config.access_ttl_for(request.expires_in_seconds);
        let access_token = token::issue_access_token(user.id, &self.config.token_secret, ttl)
            .map_err(AuthError::TokenIssue)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        info!("User {} logged in", user.id);
        Ok((
            user,
            SessionTokens {
                access_token,
                refresh_token,
            },
        ))
    }

    /// Mint a new access token from the refresh token in the bearer header
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingHeader` / `AuthError::MalformedHeader`
    /// * `AuthError::TokenNotFound` / `AuthError::TokenExpired` / `AuthError::TokenRevoked`
    pub async fn refresh(&self, headers: &HeaderMap) -> AuthResult<String> {
        let refresh_token = extract::bearer_token(headers)?;
        let user_id = self.refresh_tokens.resolve(&refresh_token).await.map_err(|e| {
            warn!("Refresh rejected: {e}");
            AuthError::from(e)
        })?;

        token::issue_access_token(user_id, &self.config.token_secret, self.config.access_token_ttl)
            .map_err(AuthError::TokenIssue)
    }

    /// Revoke the refresh token in the bearer header
    ///
    /// Unknown and already-revoked tokens succeed just like live ones so the
    /// response never reveals whether a token existed.
    pub async fn revoke(&self, headers: &HeaderMap) -> AuthResult<()> {
        let refresh_token = extract::bearer_token(headers)?;

        match self.refresh_tokens.revoke(&refresh_token).await {
            Ok(RevokeOutcome::Revoked) => {
                info!("Refresh token revoked");
                Ok(())
            }
            Ok(RevokeOutcome::AlreadyRevoked) => {
                debug!("Refresh token was already revoked");
                Ok(())
            }
            Err(RefreshTokenError::NotFound) => {
                debug!("Revoke requested for unknown refresh token");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify the access token in the bearer header and return the acting principal
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<UserId> {
        let access_token = extract::bearer_token(headers)?;
        token::verify_access_token(&access_token, &self.config.token_secret).map_err(|e| {
            debug!("Access token rejected: {e}");
            AuthError::Unauthorized(e)
        })
    }

    /// Require that `principal` is the recorded owner of a resource
    pub fn ensure_owner(&self, principal: UserId, owner: UserId) -> AuthResult<()> {
        if principal == owner {
            Ok(())
        } else {
            warn!("User {principal} attempted to modify a resource owned by {owner}");
            Err(AuthError::Forbidden)
        }
    }

    /// Authenticate and require ownership in one step
    ///
    /// # Errors
    ///
    /// * `AuthError::Unauthorized` (or a header error) - No valid access token
    /// * `AuthError::Forbidden` - Valid token for a different user
    pub fn authorize_owner(&self, headers: &HeaderMap, owner: UserId) -> AuthResult<UserId> {
        let principal = self.authenticate(headers)?;
        self.ensure_owner(principal, owner)?;
        Ok(principal)
    }

    /// Replace the authenticated user's email and password
    ///
    /// Requires an access token. Every outstanding refresh token of the user
    /// is revoked before the new credentials are stored, so other sessions
    /// must log in again. If revocation fails the credentials stay unchanged;
    /// if the update fails after revocation the user keeps the old password
    /// but has to log in again.
    pub async fn change_credentials(
        &self,
        headers: &HeaderMap,
        update: UpdateCredentials,
    ) -> AuthResult<User> {
        let user_id = self.authenticate(headers)?;
        validate_email(&update.email)?;
        validate_password(&update.password)?;

        let password_hash = password::hash_password(&update.password)?;
        let revoked = self.refresh_tokens.revoke_all(user_id).await.map_err(|e| {
            warn!("Credential change for user {user_id} aborted, revoking sessions failed: {e}");
            AuthError::from(e)
        })?;

        let user = self
            .users
            .update_credentials(user_id, &update.email, &password_hash)
            .await
            .map_err(email_conflict)?
            .ok_or(AuthError::UserNotFound)?;

        info!("User {user_id} changed credentials, {revoked} refresh token(s) revoked");
        Ok(user)
    }

    /// Check the service API key in the authorization header
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingHeader` / `AuthError::MalformedHeader`
    /// * `AuthError::InvalidApiKey` - Key present but wrong
    pub fn verify_service_key(&self, headers: &HeaderMap) -> AuthResult<()> {
        if extract::verify_api_key(headers, &self.config.api_key)? {
            Ok(())
        } else {
            warn!("Rejected request with invalid API key");
            Err(AuthError::InvalidApiKey)
        }
    }

    /// Upgrade a user to Chirpy Red
    pub async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> AuthResult<()> {
        if self.users.upgrade_to_chirpy_red(user_id).await? {
            info!("User {user_id} upgraded to Chirpy Red");
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Look up a user profile
    pub async fn user(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn email_conflict(err: StoreError) -> AuthError {
    match err {
        StoreError::Conflict(_) => AuthError::EmailTaken,
        other => AuthError::Store(other),
    }
}

fn validate_email(email: &str) -> AuthResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidEmail("Email must not be empty".to_string()));
    }
    if trimmed.len() != email.len() {
        return Err(AuthError::InvalidEmail(
            "Email must not have surrounding whitespace".to_string(),
        ));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidEmail(
            "Email must look like name@domain".to_string(),
        )),
    }
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}
