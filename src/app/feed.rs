use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::interaction::{Interaction, InteractionKind};
use crate::domain::post::{Post, PostStatus, PostView};
use crate::domain::settings::SiteSettings;
use crate::infra::store::{keys, Store};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Latest,
    Oldest,
    Popular,
    MostViewed,
    MostCommented,
}

/// Filter specification for the post feed. Every populated dimension must
/// match (the tag list matches any of its ids). The zero value matches
/// everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub author: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_to: Option<OffsetDateTime>,
    pub sort: SortKey,
    pub min_views: Option<i64>,
    pub min_likes: Option<i64>,
    pub has_images: Option<bool>,
}

fn matches(view: &PostView, filter: &PostFilter) -> bool {
    let post = &view.post;

    if let Some(term) = filter.search.as_deref() {
        let term = term.trim().to_lowercase();
        if !term.is_empty() {
            let hit = post.title.to_lowercase().contains(&term)
                || post.content.to_lowercase().contains(&term)
                || post.author_name.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
    }

    if let Some(category_id) = filter.category_id {
        if post.category_id != Some(category_id) {
            return false;
        }
    }

    if !filter.tag_ids.is_empty() && !filter.tag_ids.iter().any(|id| post.tag_ids.contains(id)) {
        return false;
    }

    if let Some(author) = filter.author.as_deref() {
        let author = author.trim().to_lowercase();
        if !author.is_empty() && !post.author_name.to_lowercase().contains(&author) {
            return false;
        }
    }

    if let Some(from) = filter.date_from {
        if post.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.date_to {
        if post.created_at > to {
            return false;
        }
    }

    if let Some(min_views) = filter.min_views {
        if post.view_count < min_views {
            return false;
        }
    }
    if let Some(min_likes) = filter.min_likes {
        if post.like_count < min_likes {
            return false;
        }
    }

    if let Some(want_images) = filter.has_images {
        if !post.images.is_empty() != want_images {
            return false;
        }
    }

    true
}

/// Filter and order a post collection. Sorting is stable, so ties keep
/// their input order.
pub fn apply_filter(views: &[PostView], filter: &PostFilter) -> Vec<PostView> {
    let mut out: Vec<PostView> = views.iter().filter(|v| matches(v, filter)).cloned().collect();
    match filter.sort {
        SortKey::Latest => out.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at)),
        SortKey::Oldest => out.sort_by(|a, b| a.post.created_at.cmp(&b.post.created_at)),
        SortKey::Popular => out.sort_by(|a, b| b.post.like_count.cmp(&a.post.like_count)),
        SortKey::MostViewed => out.sort_by(|a, b| b.post.view_count.cmp(&a.post.view_count)),
        SortKey::MostCommented => out.sort_by(|a, b| b.comment_count.cmp(&a.comment_count)),
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice an ordered collection into a fixed-size page. Pages are 1-based
/// and out-of-range requests clamp to the nearest valid page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
    }
}

/// Assembles post view-models and runs the filter/sort/pagination pipeline
/// over them.
#[derive(Clone)]
pub struct FeedService {
    store: Store,
    page_size: usize,
}

impl FeedService {
    pub fn new(store: Store, page_size: usize) -> Self {
        Self { store, page_size }
    }

    pub async fn list(
        &self,
        filter: &PostFilter,
        page: usize,
        viewer: Option<Uuid>,
    ) -> Result<Page<PostView>> {
        self.store.lag().await;
        let views = self.assemble(viewer, |post| post.status == PostStatus::Published);
        Ok(paginate(apply_filter(&views, filter), page, self.per_page()))
    }

    /// Page size comes from the stored site settings when an admin has set
    /// one, otherwise from the configured default.
    fn per_page(&self) -> usize {
        match self.store.get::<SiteSettings>(keys::SETTINGS) {
            Some(settings) if settings.posts_per_page >= 1 => settings.posts_per_page as usize,
            _ => self.page_size,
        }
    }

    /// Detail view: published posts for everyone, any status for the author.
    pub async fn get(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<Option<PostView>> {
        self.store.lag().await;
        let view = self
            .assemble(viewer, |post| {
                post.id == post_id
                    && (post.status == PostStatus::Published || viewer == Some(post.author_id))
            })
            .into_iter()
            .next();
        Ok(view)
    }

    /// Posts the viewer has bookmarked, newest bookmark first.
    pub async fn bookmarked(&self, viewer: Uuid) -> Result<Vec<PostView>> {
        self.store.lag().await;
        let ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);
        let mut marks: Vec<&Interaction> = ledger
            .iter()
            .filter(|i| i.user_id == viewer && i.kind == InteractionKind::Bookmark)
            .collect();
        marks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let views = self.assemble(Some(viewer), |post| post.status == PostStatus::Published);
        let ordered = marks
            .into_iter()
            .filter_map(|mark| views.iter().find(|v| v.post.id == mark.post_id).cloned())
            .collect();
        Ok(ordered)
    }

    fn assemble(&self, viewer: Option<Uuid>, keep: impl Fn(&Post) -> bool) -> Vec<PostView> {
        let posts: Vec<Post> = self.store.get_or(keys::POSTS, Vec::new);
        let comments: Vec<Comment> = self.store.get_or(keys::COMMENTS, Vec::new);
        let ledger: Vec<Interaction> = self.store.get_or(keys::INTERACTIONS, Vec::new);

        posts
            .into_iter()
            .filter(|post| keep(post))
            .map(|post| {
                let comment_count = comments
                    .iter()
                    .filter(|c| c.post_id == post.id && c.status == CommentStatus::Approved)
                    .count() as i64;
                let (is_liked, is_bookmarked) = match viewer {
                    Some(viewer) => {
                        let has = |kind: InteractionKind| {
                            ledger.iter().any(|i| {
                                i.user_id == viewer && i.post_id == post.id && i.kind == kind
                            })
                        };
                        (has(InteractionKind::Like), has(InteractionKind::Bookmark))
                    }
                    None => (false, false),
                };
                PostView {
                    post,
                    comment_count,
                    is_liked,
                    is_bookmarked,
                }
            })
            .collect()
    }
}
