#![allow(dead_code)]

use time::Duration;
use uuid::Uuid;

use quill::app::posts::NewPost;
use quill::domain::post::Post;
use quill::domain::user::User;
use quill::infra::store::keys;
use quill::AppState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

// The two hard-coded credential pairs the login simulation accepts.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin1234";
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo1234";

pub const DEFAULT_PASSWORD: &str = "testpassword123";

// ---------------------------------------------------------------------------
// TestApp — fresh in-memory state per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub state: AppState,
}

/// Every test gets its own store, so suites never share state.
pub fn app() -> TestApp {
    TestApp {
        state: AppState::in_memory(),
    }
}

impl TestApp {
    pub async fn create_user(&self, username: &str) -> User {
        self.state
            .users()
            .signup(
                username,
                &format!("{}@example.com", username),
                DEFAULT_PASSWORD,
            )
            .await
            .expect("signup fixture user")
            .user
    }

    pub async fn create_admin(&self) -> User {
        self.state
            .users()
            .login(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("admin login")
            .expect("admin credentials accepted")
            .user
    }

    pub async fn create_post(&self, author: &User, title: &str) -> Post {
        self.create_post_with(author, NewPost::published(title, "body text"))
            .await
    }

    pub async fn create_post_with(&self, author: &User, new: NewPost) -> Post {
        self.state
            .posts()
            .create_post(author, new)
            .await
            .expect("create fixture post")
    }

    /// Shift a post's created_at into the past for deterministic ordering
    /// and date-range tests.
    pub fn backdate_post(&self, post_id: Uuid, days: i64) {
        let mut posts: Vec<Post> = self.state.store.get_or(keys::POSTS, Vec::new);
        if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
            post.created_at -= Duration::days(days);
            post.updated_at = post.created_at;
        }
        self.state
            .store
            .put(keys::POSTS, &posts)
            .expect("rewrite posts");
    }

    pub async fn bump_views(&self, post_id: Uuid, times: usize) {
        for _ in 0..times {
            self.state
                .engagement()
                .increment_view_count(post_id)
                .await
                .expect("bump views");
        }
    }
}
