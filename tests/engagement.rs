//! Interaction ledger: like/bookmark toggles and the view counter.

mod common;

use common::app;
use uuid::Uuid;

// ===========================================================================
// Like toggling
// ===========================================================================

#[tokio::test]
async fn toggle_like_twice_restores_everything() {
    let app = app();
    let user = app.create_user("eng_liker").await;
    let post = app.create_post(&user, "Likeable").await;
    let engagement = app.state.engagement();

    assert!(engagement.toggle_like(user.id, post.id).await.unwrap());
    assert!(engagement.is_liked(user.id, post.id).await.unwrap());
    assert_eq!(
        app.state.posts().get_post(post.id).await.unwrap().unwrap().like_count,
        1
    );

    assert!(!engagement.toggle_like(user.id, post.id).await.unwrap());
    assert!(!engagement.is_liked(user.id, post.id).await.unwrap());
    assert_eq!(
        app.state.posts().get_post(post.id).await.unwrap().unwrap().like_count,
        0
    );
    assert!(engagement.likes_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn likes_are_per_user() {
    let app = app();
    let author = app.create_user("eng_author").await;
    let fan = app.create_user("eng_fan").await;
    let post = app.create_post(&author, "Shared").await;
    let engagement = app.state.engagement();

    engagement.toggle_like(author.id, post.id).await.unwrap();
    engagement.toggle_like(fan.id, post.id).await.unwrap();

    assert_eq!(
        app.state.posts().get_post(post.id).await.unwrap().unwrap().like_count,
        2
    );
    assert_eq!(engagement.likes_for_post(post.id).await.unwrap().len(), 2);

    engagement.toggle_like(fan.id, post.id).await.unwrap();
    assert!(engagement.is_liked(author.id, post.id).await.unwrap());
    assert!(!engagement.is_liked(fan.id, post.id).await.unwrap());
}

// ===========================================================================
// Bookmarks
// ===========================================================================

#[tokio::test]
async fn bookmarks_touch_no_counter() {
    let app = app();
    let user = app.create_user("eng_marker").await;
    let post = app.create_post(&user, "Keepable").await;
    let engagement = app.state.engagement();

    assert!(engagement.toggle_bookmark(user.id, post.id).await.unwrap());
    assert!(engagement.is_bookmarked(user.id, post.id).await.unwrap());
    assert_eq!(
        app.state.posts().get_post(post.id).await.unwrap().unwrap().like_count,
        0
    );

    let marks = engagement.bookmarks_for_user(user.id).await.unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].post_id, post.id);

    assert!(!engagement.toggle_bookmark(user.id, post.id).await.unwrap());
    assert!(engagement.bookmarks_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn like_and_bookmark_are_independent() {
    let app = app();
    let user = app.create_user("eng_both").await;
    let post = app.create_post(&user, "Both").await;
    let engagement = app.state.engagement();

    engagement.toggle_like(user.id, post.id).await.unwrap();
    engagement.toggle_bookmark(user.id, post.id).await.unwrap();
    engagement.toggle_like(user.id, post.id).await.unwrap();

    assert!(!engagement.is_liked(user.id, post.id).await.unwrap());
    assert!(engagement.is_bookmarked(user.id, post.id).await.unwrap());
}

// ===========================================================================
// View counter
// ===========================================================================

#[tokio::test]
async fn increment_view_count_adds_exactly_n() {
    let app = app();
    let user = app.create_user("eng_viewer").await;
    let counted = app.create_post(&user, "Counted").await;
    let untouched = app.create_post(&user, "Untouched").await;

    app.bump_views(counted.id, 7).await;

    let posts = app.state.posts();
    assert_eq!(posts.get_post(counted.id).await.unwrap().unwrap().view_count, 7);
    assert_eq!(posts.get_post(untouched.id).await.unwrap().unwrap().view_count, 0);
}

#[tokio::test]
async fn increment_view_count_on_missing_post() {
    let app = app();
    let count = app
        .state
        .engagement()
        .increment_view_count(Uuid::new_v4())
        .await
        .unwrap();
    assert!(count.is_none());
}
