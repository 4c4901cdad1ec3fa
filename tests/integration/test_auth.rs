//! Integration tests for the session flows against a mock backend.

mod mock_backend;

use std::sync::Arc;
use std::time::{Duration, Instant};

use mentoria_api::{Credentials, ErrorKind, MemoryTokenStore, ProfileUpdate, Registration, TokenStore};
use mentoria_store::{selectors, AuthStatus, Config, Store};
use mock_backend::MockBackend;

fn config(backend: &MockBackend) -> Config {
    Config {
        api_base_url: backend.base_url.clone(),
        auth_init_timeout_ms: 300,
        ..Config::default()
    }
}

fn store_with(backend: &MockBackend, tokens: Arc<MemoryTokenStore>) -> Store {
    Store::new(config(backend), tokens).expect("store builds")
}

#[tokio::test]
async fn test_login_stores_session() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let tokens = Arc::new(MemoryTokenStore::new());
    let store = store_with(&backend, tokens.clone());

    let user = store
        .login_user(Credentials::new("a@b.com", "secret"))
        .await
        .expect("login succeeds");

    assert_eq!(user.email, "a@b.com");
    let state = store.state().await;
    assert!(selectors::select_is_authenticated(&state));
    assert_eq!(selectors::select_user(&state).map(|u| u.email.as_str()), Some("a@b.com"));
    assert!(selectors::select_auth_error(&state).is_none());
    assert!(!selectors::select_auth_loading(&state));
    assert_eq!(tokens.load().expect("load"), state.auth.token);
}

#[tokio::test]
async fn test_login_with_wrong_password_keeps_server_message() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let tokens = Arc::new(MemoryTokenStore::new());
    let store = store_with(&backend, tokens.clone());

    let err = store
        .login_user(Credentials::new("a@b.com", "wrong"))
        .await
        .expect_err("login fails");

    assert_eq!(err.kind(), ErrorKind::AuthError);
    assert_eq!(err.message(), "Incorrect email or password");
    let state = store.state().await;
    assert_eq!(state.auth.status(), AuthStatus::AnonymousWithError);
    assert_eq!(selectors::select_auth_error(&state), Some(&err));
    assert!(tokens.load().expect("load").is_none());
}

#[tokio::test]
async fn test_register_logs_in() {
    let backend = MockBackend::start().await;
    let store = store_with(&backend, Arc::new(MemoryTokenStore::new()));

    let user = store
        .register_user(Registration::new("new@b.com", "pw").with_full_name("Ada"))
        .await
        .expect("registration succeeds");

    assert_eq!(user.display_name(), "Ada");
    let state = store.state().await;
    assert!(state.auth.is_authenticated());
    assert!(state.auth.registration_success);

    store.reset_registration_success().await;
    assert!(!store.state().await.auth.registration_success);
}

#[tokio::test]
async fn test_duplicate_registration_fails() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let store = store_with(&backend, Arc::new(MemoryTokenStore::new()));

    let err = store
        .register_user(Registration::new("a@b.com", "other"))
        .await
        .expect_err("registration fails");

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Email already registered");
    let state = store.state().await;
    assert!(!state.auth.is_authenticated());
    assert!(!state.auth.registration_success);
}

#[tokio::test]
async fn test_initialize_restores_session_with_profile() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let token = backend.issue_token("a@b.com");
    let store = store_with(&backend, Arc::new(MemoryTokenStore::with_token(token.clone())));

    let status = store.initialize_auth().await;

    assert_eq!(status, AuthStatus::Authenticated);
    let state = store.state().await;
    assert_eq!(state.auth.token.as_deref(), Some(token.as_str()));
    let user = selectors::select_user(&state).expect("user restored");
    assert!(user.profile.is_some());
    assert_eq!(selectors::select_user_profile(&state).subscription_status, "free");
}

#[tokio::test]
async fn test_initialize_with_revoked_token_clears_it() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let tokens = Arc::new(MemoryTokenStore::with_token("not-issued"));
    let store = store_with(&backend, tokens.clone());

    let status = store.initialize_auth().await;

    assert_eq!(status, AuthStatus::Anonymous);
    assert!(tokens.load().expect("load").is_none());
    // Restoration failures are not shown as auth errors.
    assert!(store.state().await.auth.error().is_none());
}

#[tokio::test]
async fn test_initialize_gives_up_on_hanging_profile() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let token = backend.issue_token("a@b.com");
    backend.state().hang_profile = true;
    let tokens = Arc::new(MemoryTokenStore::with_token(token));
    let store = store_with(&backend, tokens.clone());

    let started = Instant::now();
    let status = store.initialize_auth().await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(status, AuthStatus::Anonymous);
    assert!(!store.state().await.auth.is_loading());
    assert!(tokens.load().expect("load").is_none());
}

#[tokio::test]
async fn test_logout_clears_session_and_mentors() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    backend.seed_mentor(7, "Física", "Mecánica");
    let tokens = Arc::new(MemoryTokenStore::new());
    let store = store_with(&backend, tokens.clone());
    store
        .login_user(Credentials::new("a@b.com", "secret"))
        .await
        .expect("login succeeds");
    store.fetch_mentors().await.expect("fetch succeeds");

    store.logout_user().await;

    let state = store.state().await;
    assert!(!state.auth.is_authenticated());
    assert!(state.auth.user.is_none());
    assert!(state.mentors.mentors.is_empty());
    assert!(tokens.load().expect("load").is_none());
}

#[tokio::test]
async fn test_update_profile_merges_settings() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let token = backend.issue_token("a@b.com");
    let store = store_with(&backend, Arc::new(MemoryTokenStore::with_token(token)));
    assert_eq!(store.initialize_auth().await, AuthStatus::Authenticated);

    store
        .update_profile(ProfileUpdate {
            notifications_enabled: Some(false),
            subscription_status: None,
        })
        .await
        .expect("update succeeds");

    let profile = store.select(selectors::select_user_profile).await;
    assert!(!profile.notifications_enabled);
    assert_eq!(profile.subscription_status, "free");
}

#[tokio::test]
async fn test_rejected_token_ends_session() {
    let backend = MockBackend::start().await;
    backend.seed_user("a@b.com", "secret");
    let tokens = Arc::new(MemoryTokenStore::new());
    let store = store_with(&backend, tokens.clone());
    store
        .login_user(Credentials::new("a@b.com", "secret"))
        .await
        .expect("login succeeds");

    backend.revoke_tokens();
    let err = store.fetch_mentors().await.expect_err("fetch fails");

    assert!(err.forces_logout());
    let state = store.state().await;
    assert!(!state.auth.is_authenticated());
    assert!(tokens.load().expect("load").is_none());
    assert_eq!(
        store.navigate("/mentors").await.redirect_target(),
        Some("/auth")
    );
}
