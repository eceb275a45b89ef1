//! Store fallback behavior, error logging, and file backing.

mod common;

use common::app;
use quill::config::AppConfig;
use quill::domain::settings::SiteSettings;
use quill::infra::store::{keys, Store};
use quill::AppState;
use uuid::Uuid;

// ===========================================================================
// Malformed data falls back, never panics
// ===========================================================================

#[tokio::test]
async fn malformed_posts_read_as_empty_feed() {
    let app = app();
    app.state.store.set_item(keys::POSTS, "{not json at all");

    let page = app
        .state
        .feed()
        .list(&Default::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    // The failure lands in the bounded error log.
    let logs = app.state.store.error_logs();
    assert!(logs.iter().any(|l| l.source == keys::POSTS));
}

#[tokio::test]
async fn malformed_settings_fall_back_to_defaults() {
    let app = app();
    let admin = app.create_admin().await;
    app.state.store.set_item(keys::SETTINGS, "[definitely, broken");

    let settings = app.state.admin().settings(&admin).await.unwrap();
    assert_eq!(settings, SiteSettings::default());
}

#[tokio::test]
async fn malformed_menu_serves_the_seed() {
    let app = app();
    app.state.store.set_item(keys::MENU_ITEMS, "42");

    let items = app.state.menus().list().await.unwrap();
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn error_log_is_bounded() {
    let app = app();
    for i in 0..150 {
        app.state
            .store
            .record_error("test", &format!("failure {}", i));
    }

    let logs = app.state.store.error_logs();
    assert_eq!(logs.len(), 100);
    // Oldest entries are dropped first.
    assert_eq!(logs[0].message, "failure 50");
    assert_eq!(logs.last().unwrap().message, "failure 149");
}

#[tokio::test]
async fn corrupt_error_log_starts_fresh() {
    let app = app();
    app.state.store.set_item(keys::ERROR_LOGS, "###");

    app.state.store.record_error("test", "first after corruption");
    let logs = app.state.store.error_logs();
    assert_eq!(logs.len(), 1);
}

// ===========================================================================
// Item semantics
// ===========================================================================

#[tokio::test]
async fn item_set_get_remove() {
    let store = Store::in_memory();
    assert!(store.get_item("missing").is_none());

    store.set_item("k", "\"v\"");
    assert_eq!(store.get_item("k"), Some("\"v\"".to_string()));
    assert_eq!(store.get::<String>("k"), Some("v".to_string()));

    assert!(store.remove_item("k"));
    assert!(!store.remove_item("k"));
}

#[tokio::test]
async fn draft_keys_are_per_post() {
    let a = keys::draft(Some(Uuid::nil()));
    assert_eq!(a, format!("draft:{}", Uuid::nil()));
    assert_eq!(keys::draft(None), "draft:new");
}

// ===========================================================================
// File backing
// ===========================================================================

#[tokio::test]
async fn persist_and_reopen_roundtrip() {
    let path = std::env::temp_dir().join(format!("quill-store-{}.json", Uuid::new_v4()));

    let store = Store::open(path.clone()).await.unwrap();
    store.set_item("greeting", "\"hello\"");
    store.persist().await.unwrap();

    let reopened = Store::open(path.clone()).await.unwrap();
    assert_eq!(reopened.get::<String>("greeting"), Some("hello".to_string()));

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn corrupt_backing_file_starts_empty() {
    let path = std::env::temp_dir().join(format!("quill-corrupt-{}.json", Uuid::new_v4()));
    tokio::fs::write(&path, b"%%% not a store %%%").await.unwrap();

    let store = Store::open(path.clone()).await.unwrap();
    assert!(store.keys().is_empty());

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn state_from_config_uses_the_backing_file() {
    let path = std::env::temp_dir().join(format!("quill-state-{}.json", Uuid::new_v4()));
    let config = AppConfig {
        data_path: Some(path.clone()),
        ..AppConfig::default()
    };

    let state = AppState::from_config(&config).await.unwrap();
    let writer = state
        .users()
        .signup("persisted", "p@example.com", "longenough1")
        .await
        .unwrap()
        .user;
    state
        .posts()
        .create_post(&writer, quill::app::posts::NewPost::published("Kept", "body"))
        .await
        .unwrap();
    state.store.persist().await.unwrap();

    let reloaded = AppState::from_config(&config).await.unwrap();
    let page = reloaded
        .feed()
        .list(&Default::default(), 1, None)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].post.title, "Kept");

    let _ = tokio::fs::remove_file(&path).await;
}
