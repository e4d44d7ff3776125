//! Credential extraction from request headers.
//!
//! Both schemes ride on the standard `Authorization` header. Prefixes are
//! matched case-sensitively with exactly one space.

use http::{HeaderMap, header::AUTHORIZATION};
use subtle::ConstantTimeEq;

use super::errors::HeaderError;

/// Scheme prefix for access and refresh tokens
pub const BEARER_PREFIX: &str = "Bearer ";

/// Scheme prefix for service-to-service API keys
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, HeaderError> {
    credential(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<String, HeaderError> {
    credential(headers, API_KEY_PREFIX)
}

/// Extract the API key and compare it against `expected` in constant time
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> Result<bool, HeaderError> {
    let presented = api_key(headers)?;
    Ok(presented.as_bytes().ct_eq(expected.as_bytes()).into())
}

fn credential(headers: &HeaderMap, prefix: &str) -> Result<String, HeaderError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(HeaderError::MissingHeader)?
        .to_str()
        .map_err(|_| HeaderError::MalformedHeader)?;

    match value.strip_prefix(prefix) {
        Some(credential) if !credential.is_empty() => Ok(credential.to_string()),
        _ => Err(HeaderError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_missing_header() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(HeaderError::MissingHeader)
        );
    }

    #[test]
    fn test_bearer_wrong_scheme() {
        let headers = headers_with("Basic abc123");
        assert_eq!(bearer_token(&headers), Err(HeaderError::MalformedHeader));
    }

    #[test]
    fn test_bearer_prefix_is_case_sensitive() {
        assert_eq!(
            bearer_token(&headers_with("bearer abc123")),
            Err(HeaderError::MalformedHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer")),
            Err(HeaderError::MalformedHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer ")),
            Err(HeaderError::MalformedHeader)
        );
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(bearer_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn test_api_key() {
        let headers = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(api_key(&headers).unwrap(), "f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(
            api_key(&headers_with("Bearer f271c81ff7084ee5b99a5091b42d486e")),
            Err(HeaderError::MalformedHeader)
        );
        assert_eq!(api_key(&HeaderMap::new()), Err(HeaderError::MissingHeader));
    }

    #[test]
    fn test_verify_api_key() {
        let headers = headers_with("ApiKey secret-key");
        assert!(verify_api_key(&headers, "secret-key").unwrap());
        assert!(!verify_api_key(&headers, "other-key").unwrap());
        assert!(!verify_api_key(&headers, "secret-key-longer").unwrap());
    }
}
