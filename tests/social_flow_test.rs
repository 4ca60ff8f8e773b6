/// Integration tests for the core social flows: follow symmetry, like
/// idempotency, conversation identity and OTP expiry.
///
/// These run against a live Postgres (TEST_DATABASE_URL) and are ignored by
/// default: `cargo test -- --ignored` with the database up.
mod common;

use chrono::Utc;
use common::fixtures;

use social_api::db::{
    bookmark_repo, comment_repo, conversation_repo, follow_repo, like_repo, message_repo,
    post_repo, user_repo,
};
use social_api::security::otp;

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn follow_is_symmetric_and_toggles() {
    let pool = fixtures::create_test_pool().await;
    let a = fixtures::create_verified_user(&pool).await;
    let b = fixtures::create_verified_user(&pool).await;

    follow_repo::follow(&pool, a.id, b.id).await.unwrap();

    // Both views of the relationship come from the same row.
    assert!(follow_repo::following_ids(&pool, a.id).await.unwrap().contains(&b.id));
    assert!(follow_repo::follower_ids(&pool, b.id).await.unwrap().contains(&a.id));

    // Re-following is a no-op.
    follow_repo::follow(&pool, a.id, b.id).await.unwrap();
    assert_eq!(follow_repo::follower_ids(&pool, b.id).await.unwrap().len(), 1);

    follow_repo::unfollow(&pool, a.id, b.id).await.unwrap();
    assert!(!follow_repo::is_following(&pool, a.id, b.id).await.unwrap());
    assert!(follow_repo::follower_ids(&pool, b.id).await.unwrap().is_empty());

    fixtures::cleanup_user(&pool, a.id).await;
    fixtures::cleanup_user(&pool, b.id).await;
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn liking_twice_is_idempotent() {
    let pool = fixtures::create_test_pool().await;
    let author = fixtures::create_verified_user(&pool).await;
    let liker = fixtures::create_verified_user(&pool).await;

    let post = post_repo::create_post(&pool, "caption", "http://img/x.jpg", author.id)
        .await
        .unwrap();

    like_repo::create_like(&pool, post.id, liker.id).await.unwrap();
    let count_after_first = like_repo::count_by_post(&pool, post.id).await.unwrap();

    like_repo::create_like(&pool, post.id, liker.id).await.unwrap();
    let count_after_second = like_repo::count_by_post(&pool, post.id).await.unwrap();

    assert_eq!(count_after_first, 1);
    assert_eq!(count_after_second, 1);

    // Unlike twice is likewise a no-op.
    like_repo::delete_like(&pool, post.id, liker.id).await.unwrap();
    like_repo::delete_like(&pool, post.id, liker.id).await.unwrap();
    assert_eq!(like_repo::count_by_post(&pool, post.id).await.unwrap(), 0);

    fixtures::cleanup_user(&pool, author.id).await;
    fixtures::cleanup_user(&pool, liker.id).await;
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn first_message_creates_exactly_one_conversation() {
    let pool = fixtures::create_test_pool().await;
    let a = fixtures::create_verified_user(&pool).await;
    let b = fixtures::create_verified_user(&pool).await;

    let conv = conversation_repo::find_or_create(&pool, a.id, b.id).await.unwrap();
    message_repo::create_message(&pool, conv.id, a.id, b.id, "hello")
        .await
        .unwrap();

    assert_eq!(
        message_repo::count_for_conversation(&pool, conv.id).await.unwrap(),
        1
    );

    // The reverse pair resolves to the same conversation.
    let same = conversation_repo::find_or_create(&pool, b.id, a.id).await.unwrap();
    assert_eq!(same.id, conv.id);

    let found = conversation_repo::find_by_pair(&pool, b.id, a.id)
        .await
        .unwrap()
        .expect("conversation exists");
    assert_eq!(found.id, conv.id);

    fixtures::cleanup_user(&pool, a.id).await;
    fixtures::cleanup_user(&pool, b.id).await;
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn concurrent_first_messages_converge_on_one_conversation() {
    let pool = fixtures::create_test_pool().await;
    let a = fixtures::create_verified_user(&pool).await;
    let b = fixtures::create_verified_user(&pool).await;

    let (c1, c2) = tokio::join!(
        conversation_repo::find_or_create(&pool, a.id, b.id),
        conversation_repo::find_or_create(&pool, b.id, a.id),
    );

    assert_eq!(c1.unwrap().id, c2.unwrap().id);

    fixtures::cleanup_user(&pool, a.id).await;
    fixtures::cleanup_user(&pool, b.id).await;
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn expired_otp_rejects_and_row_can_be_removed() {
    let pool = fixtures::create_test_pool().await;
    let user = fixtures::create_expired_unverified_user(&pool).await;

    // The submitted code is the stored one, but the window has passed.
    assert!(!otp::code_matches(
        user.verification_code.as_deref(),
        user.verification_expires,
        "123456",
        Utc::now(),
    ));

    user_repo::delete_unverified(&pool, &user.email).await.unwrap();
    assert!(user_repo::find_by_email(&pool, &user.email).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires postgres (TEST_DATABASE_URL)"]
async fn deleting_a_post_cascades_comments_likes_and_bookmarks() {
    let pool = fixtures::create_test_pool().await;
    let author = fixtures::create_verified_user(&pool).await;
    let other = fixtures::create_verified_user(&pool).await;

    let post = post_repo::create_post(&pool, "to delete", "http://img/y.jpg", author.id)
        .await
        .unwrap();
    comment_repo::create_comment(&pool, post.id, other.id, "nice").await.unwrap();
    like_repo::create_like(&pool, post.id, other.id).await.unwrap();
    bookmark_repo::add_bookmark(&pool, other.id, post.id).await.unwrap();

    post_repo::delete_post(&pool, post.id).await.unwrap();

    assert!(post_repo::find_by_id(&pool, post.id).await.unwrap().is_none());
    assert!(comment_repo::comments_for_post(&pool, post.id).await.unwrap().is_empty());
    assert_eq!(like_repo::count_by_post(&pool, post.id).await.unwrap(), 0);
    assert!(bookmark_repo::bookmarked_post_ids(&pool, other.id).await.unwrap().is_empty());

    fixtures::cleanup_user(&pool, author.id).await;
    fixtures::cleanup_user(&pool, other.id).await;
}
