use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::taxonomy::{slugify, Category, Tag};
use crate::infra::seed;
use crate::infra::store::{keys, Store};

#[derive(Clone)]
pub struct TaxonomyService {
    store: Store,
}

impl TaxonomyService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Missing or unreadable data is replaced by the seed set, written back
    /// so ids stay stable across reads.
    fn load_categories(&self) -> Vec<Category> {
        if let Some(categories) = self.store.get::<Vec<Category>>(keys::CATEGORIES) {
            return categories;
        }
        let categories = seed::default_categories();
        if let Err(err) = self.store.put(keys::CATEGORIES, &categories) {
            tracing::warn!(error = %err, "could not write seed categories");
        }
        categories
    }

    fn load_tags(&self) -> Vec<Tag> {
        if let Some(tags) = self.store.get::<Vec<Tag>>(keys::TAGS) {
            return tags;
        }
        let tags = seed::default_tags();
        if let Err(err) = self.store.put(keys::TAGS, &tags) {
            tracing::warn!(error = %err, "could not write seed tags");
        }
        tags
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.store.lag().await;
        Ok(self.load_categories())
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.store.lag().await;
        Ok(self.load_tags())
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        self.store.lag().await;
        let categories = self.load_categories();
        Ok(categories.into_iter().find(|c| c.slug == slug))
    }

    pub async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        self.store.lag().await;
        let tags = self.load_tags();
        Ok(tags.into_iter().find(|t| t.slug == slug))
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<String>,
        color: &str,
    ) -> Result<Category> {
        self.store.lag().await;
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(anyhow!("category name is required"));
        }

        let mut categories = self.load_categories();
        if categories.iter().any(|c| c.slug == slug) {
            return Err(anyhow!("category already exists"));
        }

        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug,
            description,
            color: color.to_string(),
            created_at: now,
            updated_at: now,
        };
        categories.push(category.clone());
        self.store.put(keys::CATEGORIES, &categories)?;
        tracing::info!(slug = %category.slug, "category created");
        Ok(category)
    }

    pub async fn create_tag(&self, name: &str, color: Option<String>) -> Result<Tag> {
        self.store.lag().await;
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(anyhow!("tag name is required"));
        }

        let mut tags = self.load_tags();
        if tags.iter().any(|t| t.slug == slug) {
            return Err(anyhow!("tag already exists"));
        }

        let now = OffsetDateTime::now_utc();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug,
            color,
            created_at: now,
            updated_at: now,
        };
        tags.push(tag.clone());
        self.store.put(keys::TAGS, &tags)?;
        tracing::info!(slug = %tag.slug, "tag created");
        Ok(tag)
    }

    pub async fn delete_category(&self, category_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let mut categories = self.load_categories();
        let before = categories.len();
        categories.retain(|c| c.id != category_id);
        if categories.len() == before {
            return Ok(false);
        }
        self.store.put(keys::CATEGORIES, &categories)?;
        Ok(true)
    }

    pub async fn delete_tag(&self, tag_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let mut tags = self.load_tags();
        let before = tags.len();
        tags.retain(|t| t.id != tag_id);
        if tags.len() == before {
            return Ok(false);
        }
        self.store.put(keys::TAGS, &tags)?;
        Ok(true)
    }
}
