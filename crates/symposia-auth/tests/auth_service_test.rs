//! Integration tests for the authentication service.

use symposia_auth::config::AuthConfig;
use symposia_auth::service::{AuthService, LoginInput};
use symposia_auth::token;
use symposia_core::error::SymposiaError;
use symposia_core::models::user::{CreateUser, UpdateUser, UserStatus};
use symposia_core::repository::{SessionRepository, UserRepository};
use symposia_db::repository::{SurrealSessionRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

/// Spin up in-memory DB, run migrations, create an active user.
async fn setup() -> (
    SurrealUserRepository<Db>,
    SurrealSessionRepository<Db>,
    Uuid, // user_id
    Surreal<Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    symposia_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    // Activate the account (new users start pending activation).
    user_repo
        .update(
            user.id,
            UpdateUser {
                status: Some(UserStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let session_repo = SurrealSessionRepository::new(db.clone());

    (user_repo, session_repo, user.id, db)
}

#[tokio::test]
async fn login_happy_path() {
    let (user_repo, session_repo, user_id, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo.clone(), AuthConfig::default());

    let result = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    assert!(!result.session_token.is_empty());
    assert_eq!(result.user_id, user_id);

    // The stored session is keyed by the token hash, not the raw token.
    let hash = token::hash_session_token(&result.session_token);
    let session = session_repo.find_valid_by_token_hash(&hash).await.unwrap();
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.id, result.session_id);
}

#[tokio::test]
async fn login_by_email() {
    let (user_repo, session_repo, _, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo, AuthConfig::default());

    let result = svc
        .login(LoginInput {
            username_or_email: "alice@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn login_wrong_password() {
    let (user_repo, session_repo, _, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo, AuthConfig::default());

    let err = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, SymposiaError::AuthenticationFailed { .. }),
        "expected AuthenticationFailed, got: {err:?}"
    );
}

#[tokio::test]
async fn login_unknown_user() {
    let (user_repo, session_repo, _, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo, AuthConfig::default());

    let err = svc
        .login(LoginInput {
            username_or_email: "nobody".into(),
            password: "irrelevant-password".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SymposiaError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn login_pending_activation_rejected() {
    let (user_repo, session_repo, user_id, _db) = setup().await;

    user_repo
        .update(
            user_id,
            UpdateUser {
                status: Some(UserStatus::PendingActivation),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = AuthService::new(user_repo, session_repo, AuthConfig::default());

    let err = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap_err();

    match &err {
        SymposiaError::AuthenticationFailed { reason } => {
            assert!(
                reason.contains("pending"),
                "expected 'pending' in reason: {reason}"
            );
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn login_inactive_rejected() {
    let (user_repo, session_repo, user_id, _db) = setup().await;

    user_repo
        .update(
            user_id,
            UpdateUser {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = AuthService::new(user_repo, session_repo, AuthConfig::default());

    let err = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap_err();

    match &err {
        SymposiaError::AuthenticationFailed { reason } => {
            assert!(
                reason.contains("inactive"),
                "expected 'inactive' in reason: {reason}"
            );
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn logout_invalidates_session() {
    let (user_repo, session_repo, _, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo.clone(), AuthConfig::default());

    let login = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    svc.logout(&login.session_token).await.unwrap();

    let hash = token::hash_session_token(&login.session_token);
    let err = session_repo.find_valid_by_token_hash(&hash).await.unwrap_err();
    assert!(matches!(err, SymposiaError::NotFound { .. }));
}

#[tokio::test]
async fn logout_all_revokes_every_session() {
    let (user_repo, session_repo, user_id, _db) = setup().await;
    let svc = AuthService::new(user_repo, session_repo.clone(), AuthConfig::default());

    let login1 = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();
    let login2 = svc
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    svc.logout_all(user_id).await.unwrap();

    for login in [login1, login2] {
        let hash = token::hash_session_token(&login.session_token);
        assert!(session_repo.find_valid_by_token_hash(&hash).await.is_err());
    }
}
