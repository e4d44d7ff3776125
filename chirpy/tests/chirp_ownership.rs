//! Integration tests for chirp posting and ownership-checked deletion.

use chirpy::auth::{AuthConfig, AuthError, AuthManager, LoginRequest, SessionTokens};
use chirpy::chirps::{ChirpError, ChirpManager, SortOrder};
use chirpy::db::Repositories;
use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use std::sync::Arc;
use uuid::Uuid;

struct Harness {
    auth: Arc<AuthManager>,
    chirps: ChirpManager,
}

fn setup() -> Harness {
    let repos = Repositories::in_memory();
    let auth = Arc::new(AuthManager::new(
        repos.users.clone(),
        repos.refresh_tokens.clone(),
        AuthConfig::new("chirp_test_secret_key_for_jwt_signing", "key"),
    ));
    let chirps = ChirpManager::new(repos.chirps.clone(), auth.clone());
    Harness { auth, chirps }
}

async fn sign_up(harness: &Harness, email: &str) -> (Uuid, SessionTokens) {
    harness.auth.register(email, "password").await.unwrap();
    let (user, tokens) = harness
        .auth
        .login(LoginRequest {
            email: email.to_string(),
            password: "password".to_string(),
            expires_in_seconds: None,
        })
        .await
        .unwrap();
    (user.id, tokens)
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

#[tokio::test]
async fn test_delete_someone_elses_chirp_is_forbidden() {
    let harness = setup();
    let (_, alice) = sign_up(&harness, "alice@example.com").await;
    let (_, bob) = sign_up(&harness, "bob@example.com").await;

    let chirp = harness
        .chirps
        .create(&bearer(&bob.access_token), "bob's chirp")
        .await
        .unwrap();

    let err = harness
        .chirps
        .delete(&bearer(&alice.access_token), chirp.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::Auth(AuthError::Forbidden)));
    assert_eq!(err.status_code(), 403);

    // Still there
    assert_eq!(harness.chirps.get(chirp.id).await.unwrap(), chirp);
}

#[tokio::test]
async fn test_owner_can_delete() {
    let harness = setup();
    let (_, bob) = sign_up(&harness, "bob@example.com").await;
    let chirp = harness
        .chirps
        .create(&bearer(&bob.access_token), "short lived")
        .await
        .unwrap();

    harness
        .chirps
        .delete(&bearer(&bob.access_token), chirp.id)
        .await
        .expect("Owner should be able to delete");
    assert!(matches!(
        harness.chirps.get(chirp.id).await,
        Err(ChirpError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_without_valid_token_is_unauthorized() {
    let harness = setup();
    let (_, bob) = sign_up(&harness, "bob@example.com").await;
    let chirp = harness
        .chirps
        .create(&bearer(&bob.access_token), "hello")
        .await
        .unwrap();

    let err = harness
        .chirps
        .delete(&bearer("forged.token.value"), chirp.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::Auth(AuthError::Unauthorized(_))));
    assert_eq!(err.status_code(), 401);

    let err = harness
        .chirps
        .delete(&HeaderMap::new(), chirp.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_delete_missing_chirp() {
    let harness = setup();
    let (_, bob) = sign_up(&harness, "bob@example.com").await;
    let err = harness
        .chirps
        .delete(&bearer(&bob.access_token), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::NotFound));
}

#[tokio::test]
async fn test_create_requires_access_token() {
    let harness = setup();
    let (_, bob) = sign_up(&harness, "bob@example.com").await;

    let err = harness
        .chirps
        .create(&bearer(&bob.refresh_token), "sneaky")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);

    let err = harness
        .chirps
        .create(&bearer(&bob.access_token), &"x".repeat(141))
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::TooLong { .. }));
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let harness = setup();
    let (alice_id, alice) = sign_up(&harness, "alice@example.com").await;
    let (_, bob) = sign_up(&harness, "bob@example.com").await;

    for body in ["one", "two"] {
        harness
            .chirps
            .create(&bearer(&alice.access_token), body)
            .await
            .unwrap();
    }
    harness
        .chirps
        .create(&bearer(&bob.access_token), "three")
        .await
        .unwrap();

    let all = harness.chirps.list(None, SortOrder::Asc).await.unwrap();
    assert_eq!(
        all.iter().map(|c| c.body.as_str()).collect::<Vec<_>>(),
        vec!["one", "two", "three"]
    );

    let alices = harness
        .chirps
        .list(Some(alice_id), SortOrder::Desc)
        .await
        .unwrap();
    assert_eq!(
        alices.iter().map(|c| c.body.as_str()).collect::<Vec<_>>(),
        vec!["two", "one"]
    );
}
