use anyhow::Result;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::interaction::{Interaction, InteractionKind};
use crate::domain::post::Post;
use crate::infra::store::{keys, Store};

/// The interaction ledger: a flat list of (user, post, kind) tuples.
/// Toggling is add-if-absent / remove-if-present over that list.
#[derive(Clone)]
pub struct EngagementService {
    store: Store,
}

impl EngagementService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Flip like membership and return the resulting state. Keeps the
    /// post's denormalized like_count in step, floored at zero.
    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let liked = self.toggle(user_id, post_id, InteractionKind::Like)?;

        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
            post.like_count = if liked {
                post.like_count + 1
            } else {
                (post.like_count - 1).max(0)
            };
            self.store.put(keys::POSTS, &posts)?;
        }

        tracing::info!(user_id = %user_id, post_id = %post_id, liked, "like toggled");
        Ok(liked)
    }

    /// Bookmarks touch no counter.
    pub async fn toggle_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let bookmarked = self.toggle(user_id, post_id, InteractionKind::Bookmark)?;
        tracing::info!(user_id = %user_id, post_id = %post_id, bookmarked, "bookmark toggled");
        Ok(bookmarked)
    }

    pub async fn is_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        Ok(self.contains(user_id, post_id, InteractionKind::Like))
    }

    pub async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        Ok(self.contains(user_id, post_id, InteractionKind::Bookmark))
    }

    pub async fn likes_for_post(&self, post_id: Uuid) -> Result<Vec<Interaction>> {
        self.store.lag().await;
        let mut ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);
        ledger.retain(|i| i.post_id == post_id && i.kind == InteractionKind::Like);
        ledger.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ledger)
    }

    pub async fn bookmarks_for_user(&self, user_id: Uuid) -> Result<Vec<Interaction>> {
        self.store.lag().await;
        let mut ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);
        ledger.retain(|i| i.user_id == user_id && i.kind == InteractionKind::Bookmark);
        ledger.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ledger)
    }

    /// Unconditional bump on every detail-page visit: no dedup, no rate
    /// limit. Returns the new count, or `None` for an unknown post.
    pub async fn increment_view_count(&self, post_id: Uuid) -> Result<Option<i64>> {
        self.store.lag().await;
        let mut posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.view_count += 1;
        let count = post.view_count;
        self.store.put(keys::POSTS, &posts)?;
        Ok(Some(count))
    }

    fn contains(&self, user_id: Uuid, post_id: Uuid, kind: InteractionKind) -> bool {
        let ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);
        ledger
            .iter()
            .any(|i| i.user_id == user_id && i.post_id == post_id && i.kind == kind)
    }

    fn toggle(&self, user_id: Uuid, post_id: Uuid, kind: InteractionKind) -> Result<bool> {
        let mut ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);
        let position = ledger
            .iter()
            .position(|i| i.user_id == user_id && i.post_id == post_id && i.kind == kind);
        let present = match position {
            Some(index) => {
                ledger.remove(index);
                false
            }
            None => {
                ledger.push(Interaction {
                    user_id,
                    post_id,
                    kind,
                    created_at: OffsetDateTime::now_utc(),
                });
                true
            }
        };
        self.store.put(keys::INTERACTIONS, &ledger)?;
        Ok(present)
    }
}
