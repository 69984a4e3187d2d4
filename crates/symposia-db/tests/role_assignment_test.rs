//! Integration tests for the role assignment store using in-memory
//! SurrealDB.

use std::collections::BTreeSet;

use symposia_core::error::SymposiaError;
use symposia_core::models::conference::CreateConference;
use symposia_core::models::role_assignment::AssignRole;
use symposia_core::models::user::{CreateUser, UpdateUser, UserStatus};
use symposia_core::permission::{ConferenceRole, Permission};
use symposia_core::repository::{
    ConferenceRepository, RoleAssignmentRepository, UserRepository,
};
use symposia_db::repository::{
    SurrealConferenceRepository, SurrealRoleAssignmentRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create two active
/// users and one conference owned by the first.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // alice_id (conference organizer)
    Uuid, // bob_id
    Uuid, // conference_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    symposia_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let alice = user_repo
        .create(CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();
    let bob = user_repo
        .create(CreateUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    for id in [alice.id, bob.id] {
        user_repo
            .update(
                id,
                UpdateUser {
                    status: Some(UserStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let conference_repo = SurrealConferenceRepository::new(db.clone());
    let conference = conference_repo
        .create(CreateConference {
            title: "Test Symposium".into(),
            description: None,
            location: None,
            start_date: "2026-06-01".parse().unwrap(),
            end_date: "2026-06-03".parse().unwrap(),
            submission_deadline: None,
            organizer_id: alice.id,
            organization_id: None,
        })
        .await
        .unwrap();

    (db, alice.id, bob.id, conference.id)
}

#[tokio::test]
async fn assign_and_read_back() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let assignment = repo
        .assign(AssignRole {
            user_id: bob,
            conference_id,
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        })
        .await
        .unwrap();

    assert_eq!(assignment.user_id, bob);
    assert_eq!(assignment.conference_id, conference_id);
    assert_eq!(assignment.role, ConferenceRole::Reviewer);
    assert_eq!(
        assignment.permissions,
        ConferenceRole::Reviewer.template_set()
    );

    let roles = repo
        .user_roles_in_conference(bob, conference_id)
        .await
        .unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role, ConferenceRole::Reviewer);
}

#[tokio::test]
async fn reassign_replaces_permissions_without_duplicating() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Reviewer,
        custom_permissions: None,
    })
    .await
    .unwrap();

    let custom: BTreeSet<Permission> = [Permission::ReadConference].into_iter().collect();
    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Reviewer,
        custom_permissions: Some(custom.clone()),
    })
    .await
    .unwrap();

    let roles = repo
        .user_roles_in_conference(bob, conference_id)
        .await
        .unwrap();

    // Exactly one stored tuple, carrying the custom set rather than a
    // union with the template.
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].permissions, custom);
}

#[tokio::test]
async fn distinct_roles_coexist() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Author,
        custom_permissions: None,
    })
    .await
    .unwrap();
    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Reviewer,
        custom_permissions: None,
    })
    .await
    .unwrap();

    let roles = repo
        .user_roles_in_conference(bob, conference_id)
        .await
        .unwrap();
    assert_eq!(roles.len(), 2);

    let union: BTreeSet<Permission> = roles
        .iter()
        .flat_map(|r| r.permissions.clone())
        .collect();
    assert!(union.contains(&Permission::CreateAbstract));
    assert!(union.contains(&Permission::CreateReview));
}

#[tokio::test]
async fn remove_role_deletes_assignment() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Attendee,
        custom_permissions: None,
    })
    .await
    .unwrap();

    repo.remove(bob, conference_id, ConferenceRole::Attendee)
        .await
        .unwrap();

    let roles = repo
        .user_roles_in_conference(bob, conference_id)
        .await
        .unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn remove_missing_role_is_noop() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    // No assignment exists; removal must not error.
    repo.remove(bob, conference_id, ConferenceRole::Reviewer)
        .await
        .unwrap();
}

#[tokio::test]
async fn no_assignment_means_no_roles() {
    let (db, _, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let roles = repo
        .user_roles_in_conference(bob, conference_id)
        .await
        .unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn roles_are_scoped_to_their_conference() {
    let (db, alice, bob, conference_id) = setup().await;
    let conference_repo = SurrealConferenceRepository::new(db.clone());
    let repo = SurrealRoleAssignmentRepository::new(db);

    let other = conference_repo
        .create(CreateConference {
            title: "Other Symposium".into(),
            description: None,
            location: None,
            start_date: "2026-07-01".parse().unwrap(),
            end_date: "2026-07-02".parse().unwrap(),
            submission_deadline: None,
            organizer_id: alice,
            organization_id: None,
        })
        .await
        .unwrap();

    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Reviewer,
        custom_permissions: None,
    })
    .await
    .unwrap();

    // Bob's reviewer role in the first conference is invisible from the
    // second.
    let roles = repo.user_roles_in_conference(bob, other.id).await.unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn nil_conference_id_is_rejected() {
    let (db, _, bob, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let err = repo
        .assign(AssignRole {
            user_id: bob,
            conference_id: Uuid::nil(),
            role: ConferenceRole::Reviewer,
            custom_permissions: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::ConferenceContext));

    let err = repo
        .user_roles_in_conference(bob, Uuid::nil())
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::ConferenceContext));
}

#[tokio::test]
async fn conference_members_join_user_identity() {
    let (db, alice, bob, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    repo.assign(AssignRole {
        user_id: bob,
        conference_id,
        role: ConferenceRole::Author,
        custom_permissions: None,
    })
    .await
    .unwrap();

    let members = repo.conference_members(conference_id).await.unwrap();

    // Alice holds the auto-assigned organizer role, Bob is an author.
    assert_eq!(members.len(), 2);
    let alice_member = members.iter().find(|m| m.user_id == alice).unwrap();
    assert_eq!(alice_member.username, "alice");
    assert_eq!(alice_member.role, ConferenceRole::Organizer);
    let bob_member = members.iter().find(|m| m.user_id == bob).unwrap();
    assert_eq!(bob_member.email, "bob@example.com");
    assert_eq!(bob_member.role, ConferenceRole::Author);
}

#[tokio::test]
async fn user_conferences_with_role_filter() {
    let (db, alice, _, conference_id) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let all = repo.user_conferences(alice, None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].conference.id, conference_id);
    assert_eq!(all[0].role, ConferenceRole::Organizer);

    let as_reviewer = repo
        .user_conferences(alice, Some(ConferenceRole::Reviewer))
        .await
        .unwrap();
    assert!(as_reviewer.is_empty());
}
