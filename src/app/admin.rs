use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::post::{Post, PostStatus};
use crate::domain::settings::SiteSettings;
use crate::domain::user::{User, UserRole};
use crate::infra::store::{keys, Store};

#[derive(Debug, Clone, Serialize)]
pub struct SiteAnalytics {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub total_views: i64,
    pub total_likes: i64,
    pub top_posts: Vec<TopPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPost {
    pub id: Uuid,
    pub title: String,
    pub view_count: i64,
}

const TOP_POSTS: usize = 5;

/// Admin-only CRUD over every collection. Each method checks the acting
/// user's role and mutates the store directly; there is no workflow state,
/// no versioning, no audit trail.
#[derive(Clone)]
pub struct AdminService {
    store: Store,
}

impl AdminService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn require_admin(acting: &User) -> Result<()> {
        if acting.role.is_admin() {
            Ok(())
        } else {
            Err(anyhow!("admin required"))
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn list_users(
        &self,
        acting: &User,
        role: Option<UserRole>,
        search: Option<&str>,
    ) -> Result<Vec<User>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        if let Some(role) = role {
            users.retain(|u| u.role == role);
        }
        if let Some(term) = search {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                users.retain(|u| {
                    u.username.to_lowercase().contains(&term)
                        || u.email.to_lowercase().contains(&term)
                });
            }
        }
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub async fn set_user_role(
        &self,
        acting: &User,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<Option<User>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        user.role = role;
        user.updated_at = OffsetDateTime::now_utc();
        let updated = user.clone();
        self.store.put(keys::USERS, &users)?;
        tracing::info!(user_id = %user_id, role = role.as_store(), "user role changed");
        Ok(Some(updated))
    }

    pub async fn delete_users(&self, acting: &User, ids: &[Uuid]) -> Result<usize> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        let before = users.len();
        users.retain(|u| !ids.contains(&u.id));
        let removed = before - users.len();
        if removed > 0 {
            self.store.put(keys::USERS, &users)?;
            tracing::info!(removed, "users deleted");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn list_posts(
        &self,
        acting: &User,
        status: Option<PostStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Post>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        if let Some(status) = status {
            posts.retain(|p| p.status == status);
        }
        if let Some(term) = search {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                posts.retain(|p| {
                    p.title.to_lowercase().contains(&term)
                        || p.author_name.to_lowercase().contains(&term)
                });
            }
        }
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn set_post_status(
        &self,
        acting: &User,
        post_id: Uuid,
        status: PostStatus,
    ) -> Result<Option<Post>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.status = status;
        post.updated_at = OffsetDateTime::now_utc();
        let updated = post.clone();
        self.store.put(keys::POSTS, &posts)?;
        tracing::info!(post_id = %post_id, status = status.as_store(), "post status changed");
        Ok(Some(updated))
    }

    pub async fn delete_posts(&self, acting: &User, ids: &[Uuid]) -> Result<usize> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let before = posts.len();
        posts.retain(|p| !ids.contains(&p.id));
        let removed = before - posts.len();
        if removed > 0 {
            self.store.put(keys::POSTS, &posts)?;
            tracing::info!(removed, "posts deleted");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn list_comments(
        &self,
        acting: &User,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        if let Some(status) = status {
            comments.retain(|c| c.status == status);
        }
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    pub async fn set_comment_status(
        &self,
        acting: &User,
        comment_id: Uuid,
        status: CommentStatus,
    ) -> Result<Option<Comment>> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let Some(comment) = comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        comment.status = status;
        comment.updated_at = OffsetDateTime::now_utc();
        let updated = comment.clone();
        self.store.put(keys::COMMENTS, &comments)?;
        tracing::info!(comment_id = %comment_id, status = status.as_store(), "comment status changed");
        Ok(Some(updated))
    }

    pub async fn delete_comments(&self, acting: &User, ids: &[Uuid]) -> Result<usize> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let before = comments.len();
        comments.retain(|c| !ids.contains(&c.id));
        let removed = before - comments.len();
        if removed > 0 {
            self.store.put(keys::COMMENTS, &comments)?;
            tracing::info!(removed, "comments deleted");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub async fn settings(&self, acting: &User) -> Result<SiteSettings> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        Ok(self.store.get_or(keys::SETTINGS, SiteSettings::default))
    }

    pub async fn update_settings(
        &self,
        acting: &User,
        settings: SiteSettings,
    ) -> Result<SiteSettings> {
        Self::require_admin(acting)?;
        self.store.lag().await;
        if settings.posts_per_page < 1 {
            return Err(anyhow!("posts_per_page must be positive"));
        }
        self.store.put(keys::SETTINGS, &settings)?;
        tracing::info!("settings updated");
        Ok(settings)
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    /// Export every store entry as one JSON document. Entries that hold
    /// valid JSON are embedded as-is; anything else rides along as a string.
    pub async fn export_backup(&self, acting: &User) -> Result<String> {
        Self::require_admin(acting)?;
        self.store.lag().await;

        let mut entries = serde_json::Map::new();
        for (key, raw) in self.store.snapshot() {
            let value = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
            entries.insert(key, value);
        }

        let exported_at = OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)?;
        let document = serde_json::json!({
            "exported_at": exported_at,
            "entries": entries,
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Validate and load a backup document, replacing the store's contents.
    /// Returns the number of entries restored.
    pub async fn restore_backup(&self, acting: &User, payload: &str) -> Result<usize> {
        Self::require_admin(acting)?;
        self.store.lag().await;

        let document: Value =
            serde_json::from_str(payload).map_err(|err| anyhow!("invalid backup: {}", err))?;
        let Some(entries) = document.get("entries").and_then(Value::as_object) else {
            return Err(anyhow!("invalid backup: missing entries object"));
        };

        // Every entry is re-serialized to JSON text; a non-JSON value that
        // was exported as a string comes back as a JSON string, which the
        // loaders already tolerate as malformed input.
        let mut restored = std::collections::HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            restored.insert(key.clone(), serde_json::to_string(value)?);
        }

        let count = restored.len();
        self.store.replace_all(restored);
        tracing::info!(entries = count, "backup restored");
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Analytics
    // ------------------------------------------------------------------

    pub async fn analytics(&self, acting: &User) -> Result<SiteAnalytics> {
        Self::require_admin(acting)?;
        self.store.lag().await;

        let users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        let posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);

        let mut ranked: Vec<&Post> = posts.iter().collect();
        ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        let top_posts = ranked
            .iter()
            .take(TOP_POSTS)
            .map(|p| TopPost {
                id: p.id,
                title: p.title.clone(),
                view_count: p.view_count,
            })
            .collect();

        Ok(SiteAnalytics {
            users: users.len(),
            posts: posts.len(),
            comments: comments.len(),
            total_views: posts.iter().map(|p| p.view_count).sum(),
            total_likes: posts.iter().map(|p| p.like_count).sum(),
            top_posts,
        })
    }
}
