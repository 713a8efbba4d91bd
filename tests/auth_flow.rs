//! Registration, login and email-verification flows over in-memory stores.

use std::sync::Arc;

use axum::async_trait;

use student_market::auth::dto::RegisterRequest;
use student_market::auth::services as auth;
use student_market::auth::token::TokenError;
use student_market::config::AppConfig;
use student_market::errors::AppError;
use student_market::mail::Mailer;
use student_market::state::AppState;
use student_market::store::memory::MemoryStore;
use student_market::users::services as users;

fn test_state() -> AppState {
    AppState::in_memory(AppConfig::for_tests())
}

fn register_request(name: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter2!".to_string(),
        date_of_birth: Some("2001-09-14".to_string()),
        description: Some("second-year student".to_string()),
    }
}

#[tokio::test]
async fn register_login_verify_roundtrip() {
    let state = test_state();

    let (_, _, user) = auth::register(&state, register_request("Alice Doe", "Alice@Example.com"))
        .await
        .expect("registration");
    assert_eq!(user.email, "alice@example.com");
    assert!(!user.is_email_verified);
    assert!(!user.is_admin);
    assert!(!user.id.is_empty());

    // wrong password is rejected, correct one succeeds regardless of case
    let failed = auth::login(&state, "alice@example.com", "wrong").await;
    assert!(matches!(failed, Err(AppError::InvalidCredentials)));
    let (access, refresh, logged_in) = auth::login(&state, "ALICE@EXAMPLE.COM", "hunter2!")
        .await
        .expect("login");
    assert_eq!(logged_in.id, user.id);
    assert!(!access.is_empty());

    // refresh rotates the pair
    let (new_access, _, refreshed) = auth::refresh(&state, &refresh).await.expect("refresh");
    assert_eq!(refreshed.id, user.id);
    assert!(!new_access.is_empty());

    // verification link flips the flag; replaying it is a no-op success
    let token = state.verification.issue(&user.id).expect("issue");
    let verified = auth::verify_email(&state, &token).await.expect("verify");
    assert!(verified.is_email_verified);
    let again = auth::verify_email(&state, &token).await.expect("re-verify");
    assert!(again.is_email_verified);

    let stored = users::get_profile(&state, &user.id).await.expect("profile");
    assert!(stored.is_email_verified);
}

#[tokio::test]
async fn duplicate_email_conflicts_case_insensitively() {
    let state = test_state();
    auth::register(&state, register_request("Alice Doe", "alice@example.com"))
        .await
        .expect("first registration");
    let second = auth::register(&state, register_request("Other Alice", "ALICE@example.com")).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn register_rejects_invalid_fields() {
    let state = test_state();

    let mut short_name = register_request("A", "a@example.com");
    short_name.name = "A".into();
    assert!(matches!(
        auth::register(&state, short_name).await,
        Err(AppError::Validation(_))
    ));

    let bad_email = register_request("Alice Doe", "not-an-email");
    assert!(matches!(
        auth::register(&state, bad_email).await,
        Err(AppError::Validation(_))
    ));

    let mut short_password = register_request("Alice Doe", "a@example.com");
    short_password.password = "abc".into();
    assert!(matches!(
        auth::register(&state, short_password).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_dob = register_request("Alice Doe", "a@example.com");
    bad_dob.date_of_birth = Some("14/09/2001".into());
    assert!(matches!(
        auth::register(&state, bad_dob).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn garbage_verification_token_is_invalid() {
    let state = test_state();
    let result = auth::verify_email(&state, "garbage").await;
    assert!(matches!(
        result,
        Err(AppError::Token(TokenError::Invalid))
    ));
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        anyhow::bail!("smtp down")
    }
}

#[tokio::test]
async fn mail_failure_does_not_roll_back_registration() {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::assemble(
        Arc::new(AppConfig::for_tests()),
        store.clone(),
        store,
        Arc::new(FailingMailer),
    );

    let (_, _, user) = auth::register(&state, register_request("Alice Doe", "alice@example.com"))
        .await
        .expect("registration should survive a mail failure");
    assert!(state
        .users
        .find_by_id(&user.id)
        .await
        .expect("lookup")
        .is_some());

    // resending against the broken transport is still a non-error
    let sent = auth::resend_verification(&state, &user.id)
        .await
        .expect("resend");
    assert!(sent);
}

#[tokio::test]
async fn admin_bootstrap_is_idempotent() {
    let mut config = AppConfig::for_tests();
    config.admin.email = Some("admin@studentmarket.local".into());
    config.admin.password = Some("very-secret".into());
    let state = AppState::in_memory(config);

    users::bootstrap_admin(&state).await;
    users::bootstrap_admin(&state).await;

    let admin = state
        .users
        .find_by_email("admin@studentmarket.local")
        .await
        .expect("lookup")
        .expect("admin exists");
    assert!(admin.is_admin);
    assert!(admin.is_email_verified);

    // direct repository call reports the no-op
    let repeat = state
        .users
        .create_admin_if_absent("Admin", "admin@studentmarket.local", "very-secret")
        .await
        .expect("bootstrap");
    assert!(repeat.is_none());

    let all = state.users.list().await.expect("list");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn profile_update_keeps_email_and_flags() {
    let state = test_state();
    let (_, _, user) = auth::register(&state, register_request("Alice Doe", "alice@example.com"))
        .await
        .expect("registration");

    let updated = users::update_profile(
        &state,
        &user.id,
        student_market::users::dto::UpdateProfileRequest {
            name: "Alice Renamed".into(),
            date_of_birth: Some("2000-01-31".into()),
            description: Some("final-year student".into()),
        },
    )
    .await
    .expect("update");

    assert_eq!(updated.name, "Alice Renamed");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(updated.description, "final-year student");
    assert_eq!(updated.id, user.id);
}
