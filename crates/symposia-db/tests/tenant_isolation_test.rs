//! Cross-conference isolation tests for the scoped accessors.
//!
//! A row that exists under another conference must be observably
//! identical to a row that does not exist at all.

use symposia_core::error::SymposiaError;
use symposia_core::models::abstracts::{AbstractFilter, CreateAbstract, UpdateAbstract};
use symposia_core::models::conference::CreateConference;
use symposia_core::models::review::{CreateReview, Recommendation, ReviewFilter, UpdateReview};
use symposia_core::models::user::{CreateUser, UpdateUser, UserStatus};
use symposia_core::repository::{
    AbstractRepository, ConferenceRepository, Pagination, ReviewRepository, UserRepository,
};
use symposia_db::repository::{
    SurrealAbstractRepository, SurrealConferenceRepository, SurrealReviewRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: in-memory DB with one active user and two conferences.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // user_id
    Uuid, // conference_a
    Uuid, // conference_b
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    symposia_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            username: "multiauthor".into(),
            email: "multi@example.com".into(),
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

    let conference_repo = SurrealConferenceRepository::new(db.clone());
    let mut ids = Vec::new();
    for (title, start, end) in [
        ("Conference A", "2026-06-01", "2026-06-03"),
        ("Conference B", "2026-07-01", "2026-07-03"),
    ] {
        let conference = conference_repo
            .create(CreateConference {
                title: title.into(),
                description: None,
                location: None,
                start_date: start.parse().unwrap(),
                end_date: end.parse().unwrap(),
                submission_deadline: None,
                organizer_id: user.id,
                organization_id: None,
            })
            .await
            .unwrap();
        ids.push(conference.id);
    }

    (db, user.id, ids[0], ids[1])
}

fn abstract_input(author_id: Uuid, title: &str) -> CreateAbstract {
    CreateAbstract {
        author_id,
        title: title.into(),
        content: "Content".into(),
        keywords: vec!["rust".into()],
    }
}

#[tokio::test]
async fn cross_conference_get_is_not_found() {
    let (db, user, conf_a, conf_b) = setup().await;
    let repo = SurrealAbstractRepository::new(db);

    let submission = repo
        .create(conf_a, abstract_input(user, "Abstract in A"))
        .await
        .unwrap();

    // Fetching through the wrong conference looks exactly like fetching
    // a nonexistent id.
    let wrong_conference = repo.get_by_id(conf_b, submission.id).await.unwrap_err();
    let missing_id = repo.get_by_id(conf_a, Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(wrong_conference, SymposiaError::NotFound { .. }));
    assert!(matches!(missing_id, SymposiaError::NotFound { .. }));

    // The right conference still sees it.
    let found = repo.get_by_id(conf_a, submission.id).await.unwrap();
    assert_eq!(found.id, submission.id);
}

#[tokio::test]
async fn find_all_returns_only_rows_of_the_given_conference() {
    let (db, user, conf_a, conf_b) = setup().await;
    let repo = SurrealAbstractRepository::new(db);

    for i in 0..3 {
        repo.create(conf_a, abstract_input(user, &format!("Abstract A-{i}")))
            .await
            .unwrap();
    }
    for i in 0..2 {
        repo.create(conf_b, abstract_input(user, &format!("Abstract B-{i}")))
            .await
            .unwrap();
    }

    let in_a = repo
        .find_all(conf_a, AbstractFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(in_a.len(), 3);
    assert!(in_a.iter().all(|a| a.conference_id == conf_a));

    let in_b = repo
        .find_all(conf_b, AbstractFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(in_b.len(), 2);
    assert!(in_b.iter().all(|a| a.conference_id == conf_b));
}

#[tokio::test]
async fn find_all_filters_append_to_tenant_clause() {
    let (db, user, conf_a, _) = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let repo = SurrealAbstractRepository::new(db);

    let other = user_repo
        .create(CreateUser {
            username: "other-author".into(),
            email: "other@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    repo.create(conf_a, abstract_input(user, "Mine"))
        .await
        .unwrap();
    repo.create(conf_a, abstract_input(other.id, "Theirs"))
        .await
        .unwrap();

    let mine = repo
        .find_all(
            conf_a,
            AbstractFilter {
                author_id: Some(user),
                status: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Mine");
}

#[tokio::test]
async fn update_through_wrong_conference_affects_nothing() {
    let (db, user, conf_a, conf_b) = setup().await;
    let repo = SurrealAbstractRepository::new(db);

    let submission = repo
        .create(conf_a, abstract_input(user, "Original Title"))
        .await
        .unwrap();

    let err = repo
        .update(
            conf_b,
            submission.id,
            UpdateAbstract {
                title: Some("Hijacked Title".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::NotFound { .. }));

    // The row is untouched.
    let unchanged = repo.get_by_id(conf_a, submission.id).await.unwrap();
    assert_eq!(unchanged.title, "Original Title");
}

#[tokio::test]
async fn delete_through_wrong_conference_affects_nothing() {
    let (db, user, conf_a, conf_b) = setup().await;
    let repo = SurrealAbstractRepository::new(db);

    let submission = repo
        .create(conf_a, abstract_input(user, "Survivor"))
        .await
        .unwrap();

    let err = repo.delete(conf_b, submission.id).await.unwrap_err();
    assert!(matches!(err, SymposiaError::NotFound { .. }));

    assert!(repo.get_by_id(conf_a, submission.id).await.is_ok());
}

#[tokio::test]
async fn nil_conference_id_is_a_contract_violation() {
    let (db, user, conf_a, _) = setup().await;
    let repo = SurrealAbstractRepository::new(db);

    let submission = repo
        .create(conf_a, abstract_input(user, "Scoped"))
        .await
        .unwrap();

    let err = repo
        .create(Uuid::nil(), abstract_input(user, "Unscoped"))
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::ConferenceContext));

    let err = repo.get_by_id(Uuid::nil(), submission.id).await.unwrap_err();
    assert!(matches!(err, SymposiaError::ConferenceContext));

    let err = repo
        .find_all(Uuid::nil(), AbstractFilter::default(), Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::ConferenceContext));
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn review_against_foreign_abstract_is_not_found() {
    let (db, user, conf_a, conf_b) = setup().await;
    let abstracts = SurrealAbstractRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let submission = abstracts
        .create(conf_a, abstract_input(user, "Reviewed Abstract"))
        .await
        .unwrap();

    // The abstract lives in conference A; reviewing it through B fails
    // as if it did not exist.
    let err = reviews
        .create(
            conf_b,
            CreateReview {
                abstract_id: submission.id,
                reviewer_id: user,
                score: 8,
                comments: None,
                recommendation: Recommendation::Accept,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::NotFound { .. }));
}

#[tokio::test]
async fn reviews_scope_to_their_conference() {
    let (db, user, conf_a, conf_b) = setup().await;
    let abstracts = SurrealAbstractRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let abstract_a = abstracts
        .create(conf_a, abstract_input(user, "Abstract A"))
        .await
        .unwrap();
    let abstract_b = abstracts
        .create(conf_b, abstract_input(user, "Abstract B"))
        .await
        .unwrap();

    reviews
        .create(
            conf_a,
            CreateReview {
                abstract_id: abstract_a.id,
                reviewer_id: user,
                score: 8,
                comments: Some("Strong".into()),
                recommendation: Recommendation::Accept,
            },
        )
        .await
        .unwrap();
    reviews
        .create(
            conf_b,
            CreateReview {
                abstract_id: abstract_b.id,
                reviewer_id: user,
                score: 6,
                comments: None,
                recommendation: Recommendation::Revise,
            },
        )
        .await
        .unwrap();

    let in_a = reviews
        .find_all(conf_a, ReviewFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(in_a.len(), 1);
    assert_eq!(in_a[0].abstract_id, abstract_a.id);

    let in_b = reviews
        .find_all(conf_b, ReviewFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(in_b.len(), 1);
    assert_eq!(in_b[0].abstract_id, abstract_b.id);
}

#[tokio::test]
async fn one_review_per_reviewer_per_abstract() {
    let (db, user, conf_a, _) = setup().await;
    let abstracts = SurrealAbstractRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let submission = abstracts
        .create(conf_a, abstract_input(user, "Single Review"))
        .await
        .unwrap();

    reviews
        .create(
            conf_a,
            CreateReview {
                abstract_id: submission.id,
                reviewer_id: user,
                score: 7,
                comments: None,
                recommendation: Recommendation::Accept,
            },
        )
        .await
        .unwrap();

    let err = reviews
        .create(
            conf_a,
            CreateReview {
                abstract_id: submission.id,
                reviewer_id: user,
                score: 9,
                comments: None,
                recommendation: Recommendation::Accept,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::AlreadyExists { .. }));
}

#[tokio::test]
async fn review_update_and_average_stay_scoped() {
    let (db, user, conf_a, conf_b) = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let abstracts = SurrealAbstractRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let second_reviewer = user_repo
        .create(CreateUser {
            username: "reviewer2".into(),
            email: "reviewer2@example.com".into(),
            password: "correct-horse-battery".into(),
        })
        .await
        .unwrap();

    let submission = abstracts
        .create(conf_a, abstract_input(user, "Scored Abstract"))
        .await
        .unwrap();

    let review = reviews
        .create(
            conf_a,
            CreateReview {
                abstract_id: submission.id,
                reviewer_id: user,
                score: 4,
                comments: None,
                recommendation: Recommendation::Revise,
            },
        )
        .await
        .unwrap();
    reviews
        .create(
            conf_a,
            CreateReview {
                abstract_id: submission.id,
                reviewer_id: second_reviewer.id,
                score: 9,
                comments: None,
                recommendation: Recommendation::Accept,
            },
        )
        .await
        .unwrap();

    // Update through the wrong conference misses.
    let err = reviews
        .update(
            conf_b,
            review.id,
            UpdateReview {
                score: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SymposiaError::NotFound { .. }));

    let aggregate = reviews.average_score(conf_a, submission.id).await.unwrap();
    assert_eq!(aggregate.total_reviews, 2);
    assert_eq!(aggregate.average_score, Some(6.5));

    // The same abstract seen from the wrong conference has no reviews.
    let aggregate = reviews.average_score(conf_b, submission.id).await.unwrap();
    assert_eq!(aggregate.total_reviews, 0);
    assert_eq!(aggregate.average_score, None);
}
