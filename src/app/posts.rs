use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::post::{DraftPayload, Post, PostStatus};
use crate::domain::user::User;
use crate::infra::store::{keys, Store};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub images: Vec<String>,
    pub status: PostStatus,
}

impl NewPost {
    pub fn published(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category_id: None,
            tag_ids: Vec::new(),
            images: Vec::new(),
            status: PostStatus::Published,
        }
    }

    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            status: PostStatus::Draft,
            ..Self::published(title, content)
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Option<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub images: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

#[derive(Clone)]
pub struct PostService {
    store: Store,
}

impl PostService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, author: &User, new: NewPost) -> Result<Post> {
        self.store.lag().await;

        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(anyhow!("title is required"));
        }
        if new.content.trim().is_empty() {
            return Err(anyhow!("content is required"));
        }

        // Weak referential check: the author must be a known user.
        let users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        if !users.iter().any(|u| u.id == author.id) {
            return Err(anyhow!("unknown author"));
        }

        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            title,
            content: new.content,
            author_id: author.id,
            author_name: author.username.clone(),
            category_id: new.category_id,
            tag_ids: new.tag_ids,
            images: new.images,
            created_at: now,
            updated_at: now,
            view_count: 0,
            like_count: 0,
            status: new.status,
        };

        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        posts.push(post.clone());
        self.store.put(keys::POSTS, &posts)?;
        tracing::info!(post_id = %post.id, author = %post.author_name, status = post.status.as_store(), "post created");

        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        self.store.lag().await;
        let posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        Ok(posts.into_iter().find(|p| p.id == post_id))
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>> {
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        posts.retain(|p| p.author_id == author_id);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// Author-scoped edit; someone else's post reads as absent.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        update: UpdatePost,
    ) -> Result<Option<Post>> {
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let Some(post) = posts
            .iter_mut()
            .find(|p| p.id == post_id && p.author_id == author_id)
        else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(anyhow!("title is required"));
            }
            post.title = title;
        }
        if let Some(content) = update.content {
            if content.trim().is_empty() {
                return Err(anyhow!("content is required"));
            }
            post.content = content;
        }
        if let Some(category_id) = update.category_id {
            post.category_id = category_id;
        }
        if let Some(tag_ids) = update.tag_ids {
            post.tag_ids = tag_ids;
        }
        if let Some(images) = update.images {
            post.images = images;
        }
        if let Some(status) = update.status {
            post.status = status;
        }
        post.updated_at = OffsetDateTime::now_utc();

        let updated = post.clone();
        self.store.put(keys::POSTS, &posts)?;
        tracing::info!(post_id = %post_id, "post updated");
        Ok(Some(updated))
    }

    /// Author-scoped delete. A plain filter: comments and ledger rows for
    /// the post are left behind, matching the weak invariants.
    pub async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let before = posts.len();
        posts.retain(|p| !(p.id == post_id && p.author_id == author_id));
        if posts.len() == before {
            return Ok(false);
        }
        self.store.put(keys::POSTS, &posts)?;
        self.store.remove_item(&keys::draft(Some(post_id)));
        tracing::info!(post_id = %post_id, "post deleted");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Drafts — autosaved editor state, keyed per post
    // ------------------------------------------------------------------

    pub async fn save_draft(
        &self,
        post_id: Option<Uuid>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<DraftPayload> {
        self.store.lag().await;
        let draft = DraftPayload {
            title: title.into(),
            content: content.into(),
            saved_at: OffsetDateTime::now_utc(),
        };
        self.store.put(&keys::draft(post_id), &draft)?;
        Ok(draft)
    }

    pub async fn load_draft(&self, post_id: Option<Uuid>) -> Result<Option<DraftPayload>> {
        self.store.lag().await;
        Ok(self.store.get(&keys::draft(post_id)))
    }

    pub async fn discard_draft(&self, post_id: Option<Uuid>) -> Result<bool> {
        self.store.lag().await;
        Ok(self.store.remove_item(&keys::draft(post_id)))
    }
}
