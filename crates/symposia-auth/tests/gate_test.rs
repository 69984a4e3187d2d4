//! End-to-end tests for the authorization gate over in-memory
//! SurrealDB: session resolution, per-conference permission checks,
//! cross-conference denial, and revocation immediacy.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use symposia_auth::config::AuthConfig;
use symposia_auth::gate::AuthorizationGate;
use symposia_auth::request::RequestIdentity;
use symposia_auth::service::{AuthService, LoginInput};
use symposia_core::models::conference::CreateConference;
use symposia_core::models::role_assignment::AssignRole;
use symposia_core::models::session::CreateSession;
use symposia_core::models::user::{CreateUser, UpdateUser, UserStatus};
use symposia_core::permission::{ConferenceRole, Feature, Permission};
use symposia_core::repository::{
    ConferenceRepository, RoleAssignmentRepository, SessionRepository, UserRepository,
};
use symposia_db::repository::{
    SurrealConferenceRepository, SurrealRoleAssignmentRepository, SurrealSessionRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type Gate = AuthorizationGate<
    SurrealUserRepository<Db>,
    SurrealSessionRepository<Db>,
    SurrealRoleAssignmentRepository<Db>,
>;

struct Fixture {
    db: Surreal<Db>,
    gate: Gate,
    auth: AuthService<SurrealUserRepository<Db>, SurrealSessionRepository<Db>>,
    alice: Uuid,
    bob: Uuid,
    conf_a: Uuid,
    conf_b: Uuid,
}

/// Two active users; Alice organizes both conferences.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    symposia_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let mut ids = Vec::new();
    for (username, email) in [
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ] {
        let user = user_repo
            .create(CreateUser {
                username: username.into(),
                email: email.into(),
                password: "correct-horse-battery".into(),
            })
            .await
            .unwrap();
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
        ids.push(user.id);
    }
    let (alice, bob) = (ids[0], ids[1]);

    let conference_repo = SurrealConferenceRepository::new(db.clone());
    let mut conf_ids = Vec::new();
    for title in ["Gate Conf A", "Gate Conf B"] {
        let conference = conference_repo
            .create(CreateConference {
                title: title.into(),
                description: None,
                location: None,
                start_date: "2026-06-01".parse().unwrap(),
                end_date: "2026-06-03".parse().unwrap(),
                submission_deadline: None,
                organizer_id: alice,
                organization_id: None,
            })
            .await
            .unwrap();
        conf_ids.push(conference.id);
    }

    let session_repo = SurrealSessionRepository::new(db.clone());
    let gate = AuthorizationGate::new(
        user_repo.clone(),
        session_repo.clone(),
        SurrealRoleAssignmentRepository::new(db.clone()),
    );
    let auth = AuthService::new(user_repo, session_repo, AuthConfig::default());

    Fixture {
        db,
        gate,
        auth,
        alice,
        bob,
        conf_a: conf_ids[0],
        conf_b: conf_ids[1],
    }
}

async fn login(fixture: &Fixture, username: &str) -> RequestIdentity {
    let login = fixture
        .auth
        .login(LoginInput {
            username_or_email: username.into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();
    RequestIdentity::from_cookie_header(&format!("session_id={}", login.session_token))
}

#[tokio::test]
async fn organizer_can_act_in_their_conference() {
    let fixture = setup().await;
    let identity = login(&fixture, "alice").await;

    // Alice got the organizer role from conference creation.
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::ReadAbstracts, fixture.conf_a, &identity)
            .await
    );
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::ManageMembers, fixture.conf_a, &identity)
            .await
    );
}

#[tokio::test]
async fn valid_session_without_role_is_denied() {
    let fixture = setup().await;
    let identity = login(&fixture, "bob").await;

    // Bob is authenticated but holds no role in conference A: 403
    // territory, regardless of the accessor being callable.
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ReadAbstracts, fixture.conf_a, &identity)
            .await
    );
}

#[tokio::test]
async fn permission_is_bound_to_the_checked_conference() {
    let fixture = setup().await;
    let roles = SurrealRoleAssignmentRepository::new(fixture.db.clone());

    roles
        .assign(AssignRole {
            user_id: fixture.bob,
            conference_id: fixture.conf_a,
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        })
        .await
        .unwrap();

    let identity = login(&fixture, "bob").await;

    // Reviewer in A, nothing in B: the same check against B must fail.
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::ReadAbstracts, fixture.conf_a, &identity)
            .await
    );
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ReadAbstracts, fixture.conf_b, &identity)
            .await
    );
}

#[tokio::test]
async fn multiple_roles_grant_the_union() {
    let fixture = setup().await;
    let roles = SurrealRoleAssignmentRepository::new(fixture.db.clone());

    for role in [ConferenceRole::Author, ConferenceRole::Reviewer] {
        roles
            .assign(AssignRole {
                user_id: fixture.bob,
                conference_id: fixture.conf_a,
                role,
                custom_permissions: None,
            })
            .await
            .unwrap();
    }

    let identity = login(&fixture, "bob").await;

    // author grants create:abstract, reviewer grants create:review;
    // holding both grants both.
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::CreateAbstract, fixture.conf_a, &identity)
            .await
    );
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::CreateReview, fixture.conf_a, &identity)
            .await
    );
    // Neither template grants member management.
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ManageMembers, fixture.conf_a, &identity)
            .await
    );
}

#[tokio::test]
async fn revocation_is_visible_on_the_next_check() {
    let fixture = setup().await;
    let roles = SurrealRoleAssignmentRepository::new(fixture.db.clone());

    roles
        .assign(AssignRole {
            user_id: fixture.bob,
            conference_id: fixture.conf_a,
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        })
        .await
        .unwrap();

    let identity = login(&fixture, "bob").await;
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::CreateReview, fixture.conf_a, &identity)
            .await
    );

    roles
        .remove(fixture.bob, fixture.conf_a, ConferenceRole::Reviewer)
        .await
        .unwrap();

    // Same session, next check: the revoked permission is gone.
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::CreateReview, fixture.conf_a, &identity)
            .await
    );
}

#[tokio::test]
async fn custom_grant_narrows_to_the_exact_set() {
    let fixture = setup().await;
    let roles = SurrealRoleAssignmentRepository::new(fixture.db.clone());

    roles
        .assign(AssignRole {
            user_id: fixture.bob,
            conference_id: fixture.conf_a,
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        })
        .await
        .unwrap();

    let identity = login(&fixture, "bob").await;
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::CreateReview, fixture.conf_a, &identity)
            .await
    );

    // Re-assign with a narrowed custom set: the template does not bleed
    // back in.
    let custom: BTreeSet<Permission> = [Permission::ReadConference].into_iter().collect();
    roles
        .assign(AssignRole {
            user_id: fixture.bob,
            conference_id: fixture.conf_a,
            role: ConferenceRole::Reviewer,
            custom_permissions: Some(custom),
        })
        .await
        .unwrap();

    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::CreateReview, fixture.conf_a, &identity)
            .await
    );
    assert!(
        fixture
            .gate
            .can_request_in_conference(Permission::ReadConference, fixture.conf_a, &identity)
            .await
    );
}

#[tokio::test]
async fn platform_feature_checks() {
    let fixture = setup().await;
    let identity = login(&fixture, "alice").await;

    // Default feature template includes conference creation.
    assert!(
        fixture
            .gate
            .can_request(Feature::CreateConference, &identity)
            .await
    );

    // No session at all: denied, not an error.
    assert!(
        !fixture
            .gate
            .can_request(Feature::CreateConference, &RequestIdentity::anonymous())
            .await
    );
}

#[tokio::test]
async fn garbage_and_expired_sessions_are_denied() {
    let fixture = setup().await;
    let sessions = SurrealSessionRepository::new(fixture.db.clone());

    // Fabricated token that hashes to nothing in the store.
    let bogus = RequestIdentity::from_token("completely-made-up");
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ReadConference, fixture.conf_a, &bogus)
            .await
    );

    // A real session row whose expiry already passed.
    let raw = "expired-session-token";
    sessions
        .create(CreateSession {
            user_id: fixture.alice,
            token_hash: symposia_auth::token::hash_session_token(raw),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

    let expired = RequestIdentity::from_token(raw);
    assert!(fixture.gate.user_from_request(&expired).await.is_none());
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ReadConference, fixture.conf_a, &expired)
            .await
    );
}

#[tokio::test]
async fn logout_denies_the_very_next_request() {
    let fixture = setup().await;

    let login_out = fixture
        .auth
        .login(LoginInput {
            username_or_email: "alice".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();
    let identity = RequestIdentity::from_token(login_out.session_token.clone());

    assert!(fixture.gate.user_from_request(&identity).await.is_some());

    fixture.auth.logout(&login_out.session_token).await.unwrap();

    assert!(fixture.gate.user_from_request(&identity).await.is_none());
}

#[tokio::test]
async fn user_from_request_resolves_the_acting_user() {
    let fixture = setup().await;
    let identity = login(&fixture, "bob").await;

    let user = fixture.gate.user_from_request(&identity).await.unwrap();
    assert_eq!(user.id, fixture.bob);
    assert_eq!(user.username, "bob");
}

#[tokio::test]
async fn conference_context_aggregates_roles_and_permissions() {
    let fixture = setup().await;
    let roles = SurrealRoleAssignmentRepository::new(fixture.db.clone());

    for role in [ConferenceRole::Author, ConferenceRole::Attendee] {
        roles
            .assign(AssignRole {
                user_id: fixture.bob,
                conference_id: fixture.conf_a,
                role,
                custom_permissions: None,
            })
            .await
            .unwrap();
    }

    let identity = login(&fixture, "bob").await;
    let context = fixture
        .gate
        .user_conference_context(&identity, fixture.conf_a)
        .await
        .unwrap();

    assert_eq!(context.user.id, fixture.bob);
    assert_eq!(context.roles.len(), 2);
    assert!(context.permissions.contains(&Permission::CreateAbstract));
    assert!(context.permissions.contains(&Permission::ReadSchedule));
    assert!(!context.permissions.contains(&Permission::ManageMembers));

    // No membership in conference B: empty context, not an error.
    let context = fixture
        .gate
        .user_conference_context(&identity, fixture.conf_b)
        .await
        .unwrap();
    assert!(context.roles.is_empty());
    assert!(context.permissions.is_empty());
}

#[tokio::test]
async fn resolver_treats_nil_conference_as_empty() {
    let fixture = setup().await;

    let permissions = fixture
        .gate
        .resolver()
        .permissions_in_conference(fixture.alice, Uuid::nil())
        .await
        .unwrap();
    assert!(permissions.is_empty());

    let identity = login(&fixture, "alice").await;
    assert!(
        !fixture
            .gate
            .can_request_in_conference(Permission::ReadConference, Uuid::nil(), &identity)
            .await
    );
}
