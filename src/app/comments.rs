use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentStatus, CommentThread};
use crate::domain::post::Post;
use crate::domain::settings::SiteSettings;
use crate::domain::user::User;
use crate::infra::store::{keys, Store};

#[derive(Clone)]
pub struct CommentService {
    store: Store,
}

impl CommentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Add a comment or a single-level reply. A reply's parent must be a
    /// top-level comment on the same post; deeper nesting is rejected.
    pub async fn add_comment(
        &self,
        author: &User,
        post_id: Uuid,
        content: impl Into<String>,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        self.store.lag().await;

        let content = content.into();
        if content.trim().is_empty() {
            return Err(anyhow!("comment is empty"));
        }

        let settings: SiteSettings = self.store.get_or(keys::SETTINGS, SiteSettings::default);
        if !settings.allow_comments {
            return Err(anyhow!("comments are disabled"));
        }

        let posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        if !posts.iter().any(|p| p.id == post_id) {
            return Err(anyhow!("post not found"));
        }

        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        if let Some(parent_id) = parent_id {
            let Some(parent) = comments.iter().find(|c| c.id == parent_id) else {
                return Err(anyhow!("parent comment not found"));
            };
            if parent.post_id != post_id {
                return Err(anyhow!("parent comment belongs to another post"));
            }
            if parent.parent_id.is_some() {
                return Err(anyhow!("replies cannot be nested"));
            }
        }

        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: Uuid::new_v4(),
            content,
            author_id: author.id,
            author_name: author.username.clone(),
            post_id,
            parent_id,
            created_at: now,
            updated_at: now,
            liked_by: Vec::new(),
            status: if settings.require_comment_approval {
                CommentStatus::Pending
            } else {
                CommentStatus::Approved
            },
        };

        comments.push(comment.clone());
        self.store.put(keys::COMMENTS, &comments)?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, reply = parent_id.is_some(), "comment added");

        Ok(comment)
    }

    /// Top-level comments with their replies, oldest first. Approved
    /// comments are visible to everyone; a pending comment only to its
    /// author.
    pub async fn list_for_post(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentThread>> {
        self.store.lag().await;
        let comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let visible = |c: &Comment| {
            c.post_id == post_id
                && (c.status == CommentStatus::Approved
                    || (c.status == CommentStatus::Pending && viewer == Some(c.author_id)))
        };

        let mut top: Vec<Comment> = comments
            .iter()
            .filter(|c| c.parent_id.is_none() && visible(c))
            .cloned()
            .collect();
        top.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let threads = top
            .into_iter()
            .map(|comment| {
                let mut replies: Vec<Comment> = comments
                    .iter()
                    .filter(|c| c.parent_id == Some(comment.id) && visible(c))
                    .cloned()
                    .collect();
                replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                CommentThread { comment, replies }
            })
            .collect();

        Ok(threads)
    }

    /// Author-scoped edit; someone else's comment reads as absent.
    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        author_id: Uuid,
        content: impl Into<String>,
    ) -> Result<Option<Comment>> {
        self.store.lag().await;
        let content = content.into();
        if content.trim().is_empty() {
            return Err(anyhow!("comment is empty"));
        }

        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let Some(comment) = comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.author_id == author_id)
        else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = OffsetDateTime::now_utc();
        let updated = comment.clone();
        self.store.put(keys::COMMENTS, &comments)?;
        Ok(Some(updated))
    }

    /// Author-scoped delete; removes the comment's replies with it.
    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool> {
        self.store.lag().await;
        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let owned = comments
            .iter()
            .any(|c| c.id == comment_id && c.post_id == post_id && c.author_id == author_id);
        if !owned {
            return Ok(false);
        }
        comments.retain(|c| c.id != comment_id && c.parent_id != Some(comment_id));
        self.store.put(keys::COMMENTS, &comments)?;
        tracing::info!(comment_id = %comment_id, "comment deleted");
        Ok(true)
    }

    /// Flip the viewer's membership in the comment's liked_by list.
    pub async fn toggle_like(&self, comment_id: Uuid, user_id: Uuid) -> Result<Option<bool>> {
        self.store.lag().await;
        let mut comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let Some(comment) = comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        let liked = match comment.liked_by.iter().position(|id| *id == user_id) {
            Some(index) => {
                comment.liked_by.remove(index);
                false
            }
            None => {
                comment.liked_by.push(user_id);
                true
            }
        };
        self.store.put(keys::COMMENTS, &comments)?;
        Ok(Some(liked))
    }

    pub async fn count_for_post(&self, post_id: Uuid) -> Result<i64> {
        self.store.lag().await;
        let comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        Ok(comments
            .iter()
            .filter(|c| c.post_id == post_id && c.status == CommentStatus::Approved)
            .count() as i64)
    }
}
