//! Integration tests for registration, login and token round trips

mod common;

use ::common::auth::{CredentialError, Identity, TokenError, TokenIssuer, TokenSecret};
use time::{Duration, OffsetDateTime};

#[tokio::test]
async fn test_register_twice_conflicts() {
    let store = common::credential_store();

    store.register("alice", "hunter2").await.unwrap();
    let err = store.register("alice", "other").await.unwrap_err();
    assert!(matches!(err, CredentialError::Conflict(name) if name == "alice"));

    // first password still works
    assert!(store.verify("alice", "hunter2").await);
    assert!(!store.verify("alice", "other").await);
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() {
    let store = common::credential_store();

    store.register("alice", "pw-lower").await.unwrap();
    store.register("Alice", "pw-upper").await.unwrap();

    assert!(store.verify("Alice", "pw-upper").await);
    assert!(!store.verify("Alice", "pw-lower").await);
}

#[tokio::test]
async fn test_stored_hash_is_not_plaintext() {
    let store = common::credential_store();
    store.register("alice", "hunter2").await.unwrap();

    use ::common::auth::CredentialProvider;
    let hash = store
        .provider()
        .password_hash("alice")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(hash, "hunter2");
    assert!(!hash.contains("hunter2"));
}

#[tokio::test]
async fn test_login_failures_are_false_not_errors() {
    let store = common::credential_store();
    store.register("alice", "hunter2").await.unwrap();

    assert!(!store.verify("alice", "wrong").await);
    assert!(!store.verify("nobody", "hunter2").await);
    assert!(!store.verify("", "").await);
}

#[tokio::test]
async fn test_empty_fields_rejected() {
    let store = common::credential_store();
    assert!(matches!(
        store.register("", "pw").await,
        Err(CredentialError::EmptyUsername)
    ));
    assert!(matches!(
        store.register("alice", "").await,
        Err(CredentialError::EmptyPassword)
    ));
    assert!(store.provider().is_empty());
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let store = common::credential_store();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.register("alice", &format!("pw{}", i)).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(CredentialError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(store.provider().len(), 1);
}

#[test]
fn test_token_round_trip_and_expiry() {
    let issuer = common::token_issuer();
    let issued = OffsetDateTime::now_utc();
    let token = issuer.issue_at("alice", issued).unwrap();

    assert_eq!(
        issuer.verify_at(&token, issued + Duration::hours(23)),
        Ok(Identity::new("alice"))
    );
    assert_eq!(
        issuer.verify_at(&token, issued + Duration::hours(25)),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_token_from_other_process_secret_rejected() {
    let secret = TokenSecret::generate();
    let a = TokenIssuer::new(&secret, Duration::hours(1));
    let b = TokenIssuer::new(&secret, Duration::hours(1));
    let c = common::token_issuer();

    let token = a.issue("alice").unwrap();
    // same secret verifies anywhere
    assert_eq!(b.verify(&token), Ok(Identity::new("alice")));
    assert_eq!(c.verify(&token), Err(TokenError::Invalid));
}
