//! Comment and user service tests.

mod common;

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use activer_api::domain::{ActivityStatus, NewComment};
use activer_api::errors::AppError;
use activer_api::services::{CommentManager, CommentService, UserManager, UserService};
use activer_api::types::SegmentRequest;

use common::*;

fn comment(content: &str, rate: i32) -> NewComment {
    NewComment {
        content: content.to_string(),
        rate,
    }
}

#[tokio::test]
async fn new_comments_get_increasing_sequence_numbers() {
    let persistence = setup().await;
    let alice = seed_user(&persistence, "alice@example.com").await;
    let bob = seed_user(&persistence, "bob@example.com").await;
    let activity = seed_activity(&persistence, "Gardening", 0).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let first = assert_ok!(service.post(alice.id, activity.id, comment("Lovely", 5)).await);
    let second = assert_ok!(service.post(bob.id, activity.id, comment("Muddy", 2)).await);

    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
}

#[tokio::test]
async fn posting_twice_edits_the_first_comment() {
    let persistence = setup().await;
    let alice = seed_user(&persistence, "alice@example.com").await;
    let activity = seed_activity(&persistence, "Gardening", 0).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let original = assert_ok!(service.post(alice.id, activity.id, comment("Fine", 3)).await);
    let edited = assert_ok!(service.post(alice.id, activity.id, comment("Great", 5)).await);

    assert_eq!(edited.id, original.id);
    assert_eq!(edited.sequence, original.sequence);

    let page = assert_ok!(service.list(activity.id, &SegmentRequest::default(), None).await).segment;
    assert_eq!(page.total_data, 1);
    assert_eq!(page.search_data[0].content, "Great");
    assert_eq!(page.search_data[0].rate, 5);
}

#[tokio::test]
async fn invalid_comments_are_rejected() {
    let persistence = setup().await;
    let alice = seed_user(&persistence, "alice@example.com").await;
    let activity = seed_activity(&persistence, "Gardening", 0).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));

    assert!(matches!(
        service.post(alice.id, activity.id, comment("", 3)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.post(alice.id, activity.id, comment("Too good", 6)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service
            .post(alice.id, uuid::Uuid::new_v4(), comment("Nowhere", 3))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn comments_sort_by_rate() {
    let persistence = setup().await;
    let writer = seed_user(&persistence, "writer@example.com").await;
    let activity = seed_activity(&persistence, "Cooking", 0).await;
    seed_comment(&persistence, activity.id, writer.id, 2, 1).await;
    seed_comment(&persistence, activity.id, writer.id, 5, 2).await;
    seed_comment(&persistence, activity.id, writer.id, 4, 3).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let page = assert_ok!(
        service
            .list(
                activity.id,
                &SegmentRequest::new(1, 2).sorted_by("Rate", "descending"),
                None,
            )
            .await
    )
    .segment;

    let rates: Vec<i32> = page.search_data.iter().map(|c| c.rate).collect();
    assert_eq!(rates, vec![5, 4]);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.total_data, 3);
}

#[tokio::test]
async fn comments_reject_unknown_sort_keys() {
    let persistence = setup().await;
    let activity = seed_activity(&persistence, "Cooking", 0).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let err = assert_err!(
        service
            .list(
                activity.id,
                &SegmentRequest::default().sorted_by("Stars", "descending"),
                None,
            )
            .await
    );
    assert!(matches!(err, AppError::InvalidSortKey { .. }));

    let err = assert_err!(
        service
            .list(
                activity.id,
                &SegmentRequest::default().sorted_by("UserId", "ascending"),
                None,
            )
            .await
    );
    assert!(matches!(err, AppError::InvalidSortKey { .. }));
}

#[tokio::test]
async fn comment_sort_keys_match_what_is_accepted() {
    let persistence = setup().await;
    let activity = seed_activity(&persistence, "Cooking", 0).await;
    let service = CommentManager::new(Arc::new(persistence.begin()));

    for key in CommentManager::sort_keys() {
        assert_ok!(
            service
                .list(
                    activity.id,
                    &SegmentRequest::default().sorted_by(key, "ascending"),
                    None,
                )
                .await
        );
    }
    assert_ok!(
        service
            .list(
                activity.id,
                &SegmentRequest::default().sorted_by("sequence", "ascending"),
                None,
            )
            .await
    );
}

#[tokio::test]
async fn comment_list_includes_the_viewers_comment() {
    let persistence = setup().await;
    let viewer = seed_user(&persistence, "viewer@example.com").await;
    let other = seed_user(&persistence, "other@example.com").await;
    let activity = seed_activity(&persistence, "Cooking", 0).await;
    seed_comment(&persistence, activity.id, other.id, 3, 1).await;
    let own = seed_comment(&persistence, activity.id, viewer.id, 5, 2).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let response = assert_ok!(
        service
            .list(activity.id, &SegmentRequest::new(1, 1), Some(viewer.id))
            .await
    );
    assert_eq!(response.segment.total_data, 2);
    assert_eq!(response.user_comment.map(|c| c.id), Some(own.id));

    let response = assert_ok!(
        service
            .list(activity.id, &SegmentRequest::default(), Some(uuid::Uuid::new_v4()))
            .await
    );
    assert!(response.user_comment.is_none());

    let anonymous = assert_ok!(service.list(activity.id, &SegmentRequest::default(), None).await);
    assert!(anonymous.user_comment.is_none());
}

#[tokio::test]
async fn only_the_author_may_delete_a_comment() {
    let persistence = setup().await;
    let author = seed_user(&persistence, "author@example.com").await;
    let other = seed_user(&persistence, "other@example.com").await;
    let activity = seed_activity(&persistence, "Cooking", 0).await;
    let stored = seed_comment(&persistence, activity.id, author.id, 4, 1).await;

    let service = CommentManager::new(Arc::new(persistence.begin()));
    let err = assert_err!(service.delete(other.id, stored.id).await);
    assert!(matches!(err, AppError::Unauthorized));

    assert_ok!(service.delete(author.id, stored.id).await);
    let page = assert_ok!(service.list(activity.id, &SegmentRequest::default(), None).await);
    assert!(page.segment.search_data.is_empty());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let persistence = setup().await;
    let service = UserManager::new(Arc::new(persistence.begin()));

    let user = assert_ok!(
        service
            .register("new@example.com", Some("Newcomer".into()))
            .await
    );
    assert_eq!(assert_ok!(service.get_user(user.id).await).email, "new@example.com");

    let err = assert_err!(service.register("new@example.com", None).await);
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn activity_status_is_upserted_and_removed() {
    let persistence = setup().await;
    let user = seed_user(&persistence, "planner@example.com").await;
    let first = seed_activity(&persistence, "Museum", 0).await;
    let second = seed_activity(&persistence, "Concert", 0).await;

    let service = UserManager::new(Arc::new(persistence.begin()));
    assert_ok!(
        service
            .set_activity_status(user.id, first.id, ActivityStatus::Wish)
            .await
    );
    assert_ok!(
        service
            .set_activity_status(user.id, first.id, ActivityStatus::Completed)
            .await
    );
    assert_ok!(
        service
            .set_activity_status(user.id, second.id, ActivityStatus::Registered)
            .await
    );

    let statuses = assert_ok!(service.activity_statuses(user.id).await);
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[&first.id].status, "completed");
    assert_eq!(statuses[&second.id].status, "registered");

    let removed = assert_ok!(
        service
            .remove_activity_statuses(user.id, &[first.id, uuid::Uuid::new_v4()])
            .await
    );
    assert_eq!(removed, 1);
    let statuses = assert_ok!(service.activity_statuses(user.id).await);
    assert_eq!(statuses.keys().copied().collect::<Vec<_>>(), vec![second.id]);
}

#[tokio::test]
async fn search_history_rejects_unknown_sort_keys() {
    let persistence = setup().await;
    let user = seed_user(&persistence, "searcher@example.com").await;

    let service = UserManager::new(Arc::new(persistence.begin()));
    let err = assert_err!(
        service
            .search_history(
                user.id,
                &SegmentRequest::default().sorted_by("Relevance", "descending"),
            )
            .await
    );

    assert!(matches!(err, AppError::InvalidSortKey { .. }));
}
