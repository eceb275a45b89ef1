//! Fallback data used when a stored collection is missing or unreadable.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::menu::MenuItem;
use crate::domain::taxonomy::{slugify, Category, Tag};

pub fn default_categories() -> Vec<Category> {
    [
        ("Tech", "Programming, tools, and the craft", "#3b82f6"),
        ("Life", "Notes from the everyday", "#10b981"),
        ("Essays", "Longer-form writing", "#f59e0b"),
    ]
    .into_iter()
    .map(|(name, description, color)| {
        let now = OffsetDateTime::now_utc();
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            description: Some(description.to_string()),
            color: color.to_string(),
            created_at: now,
            updated_at: now,
        }
    })
    .collect()
}

pub fn default_tags() -> Vec<Tag> {
    ["rust", "writing", "notes", "tutorial"]
        .into_iter()
        .map(|name| {
            let now = OffsetDateTime::now_utc();
            Tag {
                id: Uuid::new_v4(),
                name: name.to_string(),
                slug: slugify(name),
                color: None,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

pub fn default_menu_items() -> Vec<MenuItem> {
    [("Home", "/"), ("Posts", "/posts"), ("Write", "/write")]
        .into_iter()
        .enumerate()
        .map(|(order, (name, url))| {
            let now = OffsetDateTime::now_utc();
            MenuItem {
                id: Uuid::new_v4(),
                name: name.to_string(),
                url: url.to_string(),
                order: order as i64,
                is_active: true,
                is_visible: true,
                parent_id: None,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}
