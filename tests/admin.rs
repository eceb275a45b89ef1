//! Admin surfaces: role gate, moderation, settings, backup, analytics.

mod common;

use common::app;
use quill::domain::comment::CommentStatus;
use quill::domain::post::PostStatus;
use quill::domain::settings::SiteSettings;
use quill::domain::user::UserRole;

// ===========================================================================
// Role gate
// ===========================================================================

#[tokio::test]
async fn non_admin_is_rejected_everywhere() {
    let app = app();
    let user = app.create_user("adm_pleb").await;
    let admin_api = app.state.admin();

    let err = admin_api.list_users(&user, None, None).await.unwrap_err();
    assert_eq!(err.to_string(), "admin required");
    let err = admin_api.settings(&user).await.unwrap_err();
    assert_eq!(err.to_string(), "admin required");
    let err = admin_api.export_backup(&user).await.unwrap_err();
    assert_eq!(err.to_string(), "admin required");
}

// ===========================================================================
// User management
// ===========================================================================

#[tokio::test]
async fn list_filter_and_bulk_delete_users() {
    let app = app();
    let admin = app.create_admin().await;
    let alpha = app.create_user("adm_alpha").await;
    let beta = app.create_user("adm_beta").await;
    let admin_api = app.state.admin();

    let all = admin_api.list_users(&admin, None, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let admins = admin_api
        .list_users(&admin, Some(UserRole::Admin), None)
        .await
        .unwrap();
    assert_eq!(admins.len(), 1);

    let found = admin_api
        .list_users(&admin, None, Some("ALPHA"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, alpha.id);

    let removed = admin_api
        .delete_users(&admin, &[alpha.id, beta.id])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(admin_api.list_users(&admin, None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn promote_user_to_admin() {
    let app = app();
    let admin = app.create_admin().await;
    let user = app.create_user("adm_riser").await;

    let promoted = app
        .state
        .admin()
        .set_user_role(&admin, user.id, UserRole::Admin)
        .await
        .unwrap()
        .expect("user exists");
    assert!(promoted.role.is_admin());
}

// ===========================================================================
// Post & comment moderation
// ===========================================================================

#[tokio::test]
async fn archiving_a_post_hides_it_from_the_feed() {
    let app = app();
    let admin = app.create_admin().await;
    let writer = app.create_user("adm_writer").await;
    let post = app.create_post(&writer, "Edgy").await;

    app.state
        .admin()
        .set_post_status(&admin, post.id, PostStatus::Archived)
        .await
        .unwrap()
        .expect("post exists");

    let page = app
        .state
        .feed()
        .list(&Default::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let archived = app
        .state
        .admin()
        .list_posts(&admin, Some(PostStatus::Archived), None)
        .await
        .unwrap();
    assert_eq!(archived.len(), 1);
}

#[tokio::test]
async fn bulk_delete_posts_and_comments() {
    let app = app();
    let admin = app.create_admin().await;
    let writer = app.create_user("adm_bulk").await;
    let a = app.create_post(&writer, "A").await;
    let b = app.create_post(&writer, "B").await;
    let kept = app.create_post(&writer, "Kept").await;
    let comment = app
        .state
        .comments()
        .add_comment(&writer, kept.id, "noise", None)
        .await
        .unwrap();

    let removed = app
        .state
        .admin()
        .delete_posts(&admin, &[a.id, b.id])
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let removed = app
        .state
        .admin()
        .delete_comments(&admin, &[comment.id])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(app
        .state
        .admin()
        .list_comments(&admin, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn comment_moderation_by_status() {
    let app = app();
    let admin = app.create_admin().await;
    let writer = app.create_user("adm_modq").await;
    let post = app.create_post(&writer, "Watched").await;
    let comment = app
        .state
        .comments()
        .add_comment(&writer, post.id, "fine", None)
        .await
        .unwrap();

    app.state
        .admin()
        .set_comment_status(&admin, comment.id, CommentStatus::Rejected)
        .await
        .unwrap()
        .expect("comment exists");

    let rejected = app
        .state
        .admin()
        .list_comments(&admin, Some(CommentStatus::Rejected))
        .await
        .unwrap();
    assert_eq!(rejected.len(), 1);
    // Rejected comments disappear from the public thread.
    assert!(app
        .state
        .comments()
        .list_for_post(post.id, None)
        .await
        .unwrap()
        .is_empty());
}

// ===========================================================================
// Settings
// ===========================================================================

#[tokio::test]
async fn settings_roundtrip_and_validation() {
    let app = app();
    let admin = app.create_admin().await;
    let admin_api = app.state.admin();

    assert_eq!(admin_api.settings(&admin).await.unwrap(), SiteSettings::default());

    let custom = SiteSettings {
        site_title: "My Corner".to_string(),
        posts_per_page: 25,
        ..SiteSettings::default()
    };
    admin_api.update_settings(&admin, custom.clone()).await.unwrap();
    assert_eq!(admin_api.settings(&admin).await.unwrap(), custom);

    let err = admin_api
        .update_settings(
            &admin,
            SiteSettings {
                posts_per_page: 0,
                ..SiteSettings::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "posts_per_page must be positive");
}

// ===========================================================================
// Backup
// ===========================================================================

#[tokio::test]
async fn backup_roundtrips_the_store() {
    let app = app();
    let admin = app.create_admin().await;
    let writer = app.create_user("adm_backup").await;
    let post = app.create_post(&writer, "Preserved").await;
    app.state
        .engagement()
        .toggle_like(writer.id, post.id)
        .await
        .unwrap();

    let backup = app.state.admin().export_backup(&admin).await.unwrap();

    // Wreck the live data, then restore.
    app.state
        .admin()
        .delete_posts(&admin, &[post.id])
        .await
        .unwrap();
    app.state.admin().restore_backup(&admin, &backup).await.unwrap();

    let restored = app
        .state
        .posts()
        .get_post(post.id)
        .await
        .unwrap()
        .expect("post restored");
    assert_eq!(restored.title, "Preserved");
    assert_eq!(restored.like_count, 1);
    assert!(app
        .state
        .engagement()
        .is_liked(writer.id, post.id)
        .await
        .unwrap());
    // The plain-string token entry survives too.
    assert!(app.state.users().session().is_some());
}

#[tokio::test]
async fn restore_rejects_garbage() {
    let app = app();
    let admin = app.create_admin().await;
    let admin_api = app.state.admin();

    assert!(admin_api.restore_backup(&admin, "not json").await.is_err());
    assert!(admin_api.restore_backup(&admin, "{\"wrong\": true}").await.is_err());
}

// ===========================================================================
// Analytics
// ===========================================================================

#[tokio::test]
async fn analytics_aggregates_the_collections() {
    let app = app();
    let admin = app.create_admin().await;
    let writer = app.create_user("adm_stats").await;
    let hot = app.create_post(&writer, "Hot").await;
    let cold = app.create_post(&writer, "Cold").await;
    app.bump_views(hot.id, 5).await;
    app.bump_views(cold.id, 1).await;
    app.state.engagement().toggle_like(writer.id, hot.id).await.unwrap();
    app.state
        .comments()
        .add_comment(&writer, hot.id, "self reply", None)
        .await
        .unwrap();

    let stats = app.state.admin().analytics(&admin).await.unwrap();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.posts, 2);
    assert_eq!(stats.comments, 1);
    assert_eq!(stats.total_views, 6);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.top_posts[0].id, hot.id);
    assert_eq!(stats.top_posts[0].view_count, 5);
}
