//! Access token codec.
//!
//! Access tokens are HS256 JWTs carrying `{iss, sub, iat, exp}`. They are never
//! persisted: validity is decided by signature, issuer and expiry alone, so an
//! access token cannot be revoked before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use uuid::Uuid;

use super::{errors::TokenError, models::AccessTokenClaims, models::UserId};

/// Issuer claim stamped on every access token
pub const ISSUER: &str = "chirpy";

/// Issue an access token for `subject` valid for `ttl` from now
pub fn issue_access_token(
    subject: UserId,
    secret: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    issue_access_token_at(subject, secret, ttl, Utc::now())
}

/// Issue an access token as if the current time were `now`
///
/// # Errors
///
/// * `TokenError::InvalidTtl` - `ttl` is zero or negative
/// * `TokenError::Signing` - The JWT library failed to sign
pub fn issue_access_token_at(
    subject: UserId,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    if ttl <= Duration::zero() {
        return Err(TokenError::InvalidTtl);
    }

    let claims = AccessTokenClaims {
        iss: ISSUER.to_string(),
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// Verify an access token and return its subject
pub fn verify_access_token(token: &str, secret: &str) -> Result<UserId, TokenError> {
    verify_access_token_at(token, secret, Utc::now())
}

/// Verify an access token as if the current time were `now`
///
/// # Errors
///
/// * `TokenError::InvalidSignature` - Signed with a different secret
/// * `TokenError::WrongIssuer` - `iss` is not [`ISSUER`]
/// * `TokenError::Expired` - `now` is at or past `exp`
/// * `TokenError::Malformed` - Anything unparsable, including a non-UUID subject
pub fn verify_access_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<UserId, TokenError> {
    // Expiry is checked below against the injected clock, with no leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| classify(&e))?;

    if now.timestamp() >= token_data.claims.exp {
        return Err(TokenError::Expired);
    }

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| TokenError::Malformed)
}

fn classify(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_jwt";

    #[test]
    fn test_issue_and_verify() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, Duration::hours(1)).unwrap();
        assert_eq!(verify_access_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_expires_exactly_at_ttl() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let ttl = Duration::seconds(30);
        let token = issue_access_token_at(user_id, SECRET, ttl, now).unwrap();

        let just_before = now + ttl - Duration::seconds(1);
        assert_eq!(
            verify_access_token_at(&token, SECRET, just_before).unwrap(),
            user_id
        );

        let at_expiry = now + ttl;
        assert!(matches!(
            verify_access_token_at(&token, SECRET, at_expiry),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_issued_in_the_past_is_expired() {
        let issued_at = Utc::now() - Duration::hours(2);
        let token =
            issue_access_token_at(Uuid::new_v4(), SECRET, Duration::hours(1), issued_at).unwrap();
        assert!(matches!(
            verify_access_token(&token, SECRET),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_access_token(&token, "another_secret"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            verify_access_token("wrong_token", SECRET),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            verify_access_token("", SECRET),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_foreign_issuer() {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_access_token(&token, SECRET),
            Err(TokenError::WrongIssuer)
        ));
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            iss: ISSUER.to_string(),
            sub: "42".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_access_token(&token, SECRET),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        assert!(matches!(
            issue_access_token(Uuid::new_v4(), SECRET, Duration::zero()),
            Err(TokenError::InvalidTtl)
        ));
        assert!(matches!(
            issue_access_token(Uuid::new_v4(), SECRET, Duration::seconds(-5)),
            Err(TokenError::InvalidTtl)
        ));
    }
}
