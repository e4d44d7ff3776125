//! Property-based tests for the credential hasher and access token codec.

use chirpy::auth::{
    PasswordCheck, TokenError,
    password::{hash_password, verify_password},
    token::{issue_access_token_at, verify_access_token_at},
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

proptest! {
    // Argon2 is deliberately slow; a handful of cases is plenty.
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn prop_hash_verifies_only_its_own_password(
        password in ".{0,32}",
        other in ".{0,32}",
    ) {
        let hash = hash_password(&password).unwrap();
        prop_assert_eq!(verify_password(&hash, &password).unwrap(), PasswordCheck::Match);
        if other != password {
            prop_assert_eq!(verify_password(&hash, &other).unwrap(), PasswordCheck::Mismatch);
        }
    }
}

proptest! {
    #[test]
    fn prop_token_valid_until_ttl_elapses(
        id_bytes in any::<[u8; 16]>(),
        ttl_secs in 1i64..=3600,
        issued_secs in 1_600_000_000i64..1_900_000_000,
    ) {
        let subject = Uuid::from_bytes(id_bytes);
        let now = Utc.timestamp_opt(issued_secs, 0).unwrap();
        let ttl = Duration::seconds(ttl_secs);
        let token = issue_access_token_at(subject, "prop-secret", ttl, now).unwrap();

        prop_assert_eq!(verify_access_token_at(&token, "prop-secret", now).unwrap(), subject);
        prop_assert!(matches!(
            verify_access_token_at(&token, "prop-secret", now + ttl),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn prop_token_rejects_other_secrets(
        secret in "[a-zA-Z0-9]{8,40}",
        other in "[a-zA-Z0-9]{8,40}",
    ) {
        prop_assume!(secret != other);
        let now = Utc::now();
        let token = issue_access_token_at(Uuid::new_v4(), &secret, Duration::hours(1), now).unwrap();
        prop_assert!(matches!(
            verify_access_token_at(&token, &other, now),
            Err(TokenError::InvalidSignature)
        ));
    }
}
