use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub order: i64,
    pub is_active: bool,
    pub is_visible: bool,
    /// One level of nesting only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A top-level menu item with its direct children, both in display order.
#[derive(Debug, Clone, Serialize)]
pub struct MenuNode {
    pub item: MenuItem,
    pub children: Vec<MenuItem>,
}
