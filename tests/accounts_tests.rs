//! Integration tests for accounts and sessions
//!
//! Covers sign up, login, logout and resolving session tokens into
//! identities, including expired and unknown tokens.

use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};
use tunr::db::entities::session;
use tunr::db::repositories::UserRepository;
use tunr::error::AppError;
use tunr::services::accounts::{generate_session_token, hash_session_token};
use tunr::services::{Credentials, Identity};
use tunr::test_utils::*;

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_sign_up_hashes_password() {
    let state = setup_test_app_state().await;

    let user = state
        .accounts()
        .sign_up(&credentials("listener", "supersecret"))
        .await
        .unwrap();

    assert_eq!(user.username, "listener");
    assert_ne!(user.password_hash, "supersecret");
    assert!(bcrypt::verify("supersecret", &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_sign_up_duplicate_username_conflicts() {
    let state = setup_test_app_state().await;
    create_test_user(&state.db, "listener").await;

    let result = state
        .accounts()
        .sign_up(&credentials("listener", "anotherpass"))
        .await;

    assert!(matches!(result, Err(AppError::IntegrityConflict(_))));
}

#[tokio::test]
async fn test_sign_up_validation() {
    let state = setup_test_app_state().await;

    match state.accounts().sign_up(&credentials("", "short")).await {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains("username"));
            assert!(errors.contains("password"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let long_name = "u".repeat(151);
    match state
        .accounts()
        .sign_up(&credentials(&long_name, "longenough"))
        .await
    {
        Err(AppError::Validation(errors)) => assert!(errors.contains("username")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_and_resolve() {
    let state = setup_test_app_state().await;
    let (user, token) = login_test_user(&state, "listener").await;

    assert_eq!(token.len(), 43);

    let identity = state.accounts().resolve(Some(&token)).await.unwrap();
    assert_eq!(identity, Identity::User(user));
    assert_eq!(identity.username(), Some("listener"));
}

#[tokio::test]
async fn test_login_stores_only_token_hash() {
    let state = setup_test_app_state().await;
    let (_, token) = login_test_user(&state, "listener").await;

    let sessions = session::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_ne!(sessions[0].token_hash, token);
    assert_eq!(sessions[0].token_hash, hash_session_token(&token));
    assert!(sessions[0].expires_at > Utc::now());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let state = setup_test_app_state().await;
    create_test_user(&state.db, "listener").await;

    let result = state
        .accounts()
        .login(&credentials("listener", "not the password"))
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
    assert_eq!(session::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let state = setup_test_app_state().await;

    let result = state
        .accounts()
        .login(&credentials("nobody", TEST_PASSWORD))
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let state = setup_test_app_state().await;
    let (_, token) = login_test_user(&state, "listener").await;

    state.accounts().logout(&token).await.unwrap();

    let identity = state.accounts().resolve(Some(&token)).await.unwrap();
    assert_eq!(identity, Identity::Anonymous);
    assert_eq!(session::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_logout_unknown_token_is_ignored() {
    let state = setup_test_app_state().await;

    assert!(state.accounts().logout("never-issued").await.is_ok());
}

#[tokio::test]
async fn test_resolve_missing_and_unknown_tokens() {
    let state = setup_test_app_state().await;
    let accounts = state.accounts();

    assert_eq!(accounts.resolve(None).await.unwrap(), Identity::Anonymous);
    assert_eq!(accounts.resolve(Some("")).await.unwrap(), Identity::Anonymous);
    assert_eq!(
        accounts.resolve(Some("garbage")).await.unwrap(),
        Identity::Anonymous
    );
}

#[tokio::test]
async fn test_expired_session_resolves_anonymous_and_is_removed() {
    let state = setup_test_app_state().await;
    let user = create_test_user(&state.db, "listener").await;
    let token = generate_session_token();

    UserRepository::new(state.db.clone())
        .create_session(
            user.id,
            hash_session_token(&token),
            Utc::now() - Duration::hours(1),
        )
        .await
        .unwrap();

    let identity = state.accounts().resolve(Some(&token)).await.unwrap();
    assert_eq!(identity, Identity::Anonymous);
    assert_eq!(session::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_purges_expired_sessions() {
    let state = setup_test_app_state().await;
    let user = create_test_user(&state.db, "listener").await;

    UserRepository::new(state.db.clone())
        .create_session(
            user.id,
            hash_session_token("stale"),
            Utc::now() - Duration::minutes(5),
        )
        .await
        .unwrap();

    state
        .accounts()
        .login(&credentials("listener", TEST_PASSWORD))
        .await
        .unwrap();

    let sessions = session::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_ne!(sessions[0].token_hash, hash_session_token("stale"));
}
