use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::menu::{MenuItem, MenuNode};
use crate::infra::seed;
use crate::infra::store::{keys, Store};

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateMenuItem {
    pub name: Option<String>,
    pub url: Option<String>,
    pub is_active: Option<bool>,
    pub is_visible: Option<bool>,
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Clone)]
pub struct MenuService {
    store: Store,
}

impl MenuService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All items in display order. The seed menu is the fallback when the
    /// stored value is missing or unreadable.
    pub async fn list(&self) -> Result<Vec<MenuItem>> {
        self.store.lag().await;
        let mut items = self.load();
        items.sort_by(|a, b| a.order.cmp(&b.order));
        Ok(items)
    }

    /// One-level tree of visible, active items for rendering.
    pub async fn tree(&self) -> Result<Vec<MenuNode>> {
        self.store.lag().await;
        let mut items = self.load();
        items.retain(|i| i.is_active && i.is_visible);
        items.sort_by(|a, b| a.order.cmp(&b.order));

        let nodes = items
            .iter()
            .filter(|i| i.parent_id.is_none())
            .map(|item| MenuNode {
                item: item.clone(),
                children: items
                    .iter()
                    .filter(|c| c.parent_id == Some(item.id))
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(nodes)
    }

    /// New items land at the end of the list. A parent must itself be a
    /// top-level item; nesting is one level deep.
    pub async fn create(
        &self,
        name: impl Into<String>,
        url: impl Into<String>,
        parent_id: Option<Uuid>,
    ) -> Result<MenuItem> {
        self.store.lag().await;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(anyhow!("menu name is required"));
        }

        let mut items = self.load();
        if let Some(parent_id) = parent_id {
            let Some(parent) = items.iter().find(|i| i.id == parent_id) else {
                return Err(anyhow!("parent menu item not found"));
            };
            if parent.parent_id.is_some() {
                return Err(anyhow!("menu items cannot be nested deeper than one level"));
            }
        }

        let now = OffsetDateTime::now_utc();
        let item = MenuItem {
            id: Uuid::new_v4(),
            name,
            url: url.into(),
            order: items.iter().map(|i| i.order).max().unwrap_or(-1) + 1,
            is_active: true,
            is_visible: true,
            parent_id,
            created_at: now,
            updated_at: now,
        };
        items.push(item.clone());
        self.store.put(keys::MENU_ITEMS, &items)?;
        tracing::info!(item_id = %item.id, name = %item.name, "menu item created");
        Ok(item)
    }

    pub async fn update(&self, item_id: Uuid, update: UpdateMenuItem) -> Result<Option<MenuItem>> {
        self.store.lag().await;
        let mut items = self.load();

        if let Some(Some(parent_id)) = update.parent_id {
            if parent_id == item_id {
                return Err(anyhow!("menu item cannot be its own parent"));
            }
            let parent_ok = items
                .iter()
                .any(|i| i.id == parent_id && i.parent_id.is_none());
            if !parent_ok {
                return Err(anyhow!("parent menu item not found"));
            }
            // Moving an item that has children would push them two levels
            // deep, so the item must be childless first.
            if items.iter().any(|i| i.parent_id == Some(item_id)) {
                return Err(anyhow!("menu item with children cannot be nested"));
            }
        }

        let Some(item) = items.iter_mut().find(|i| i.id == item_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(anyhow!("menu name is required"));
            }
            item.name = name;
        }
        if let Some(url) = update.url {
            item.url = url;
        }
        if let Some(is_active) = update.is_active {
            item.is_active = is_active;
        }
        if let Some(is_visible) = update.is_visible {
            item.is_visible = is_visible;
        }
        if let Some(parent_id) = update.parent_id {
            item.parent_id = parent_id;
        }
        item.updated_at = OffsetDateTime::now_utc();
        let updated = item.clone();
        self.store.put(keys::MENU_ITEMS, &items)?;
        Ok(Some(updated))
    }

    /// Children of a deleted parent are promoted to top level.
    pub async fn delete(&self, item_id: Uuid) -> Result<bool> {
        self.store.lag().await;
        let mut items = self.load();
        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            return Ok(false);
        }
        for item in items.iter_mut() {
            if item.parent_id == Some(item_id) {
                item.parent_id = None;
            }
        }
        self.store.put(keys::MENU_ITEMS, &items)?;
        tracing::info!(item_id = %item_id, "menu item deleted");
        Ok(true)
    }

    /// Assign sequential order following the given id sequence; items not
    /// named keep their relative order after the named ones.
    pub async fn reorder(&self, ordered_ids: &[Uuid]) -> Result<Vec<MenuItem>> {
        self.store.lag().await;
        let mut items = self.load();
        items.sort_by_key(|item| {
            ordered_ids
                .iter()
                .position(|id| *id == item.id)
                .unwrap_or(usize::MAX)
        });
        for (order, item) in items.iter_mut().enumerate() {
            item.order = order as i64;
            item.updated_at = OffsetDateTime::now_utc();
        }
        self.store.put(keys::MENU_ITEMS, &items)?;
        Ok(items)
    }

    /// Missing or unreadable data is replaced by the seed menu, which is
    /// written back so item ids stay stable across reads.
    fn load(&self) -> Vec<MenuItem> {
        if let Some(items) = self.store.get::<Vec<MenuItem>>(keys::MENU_ITEMS) {
            return items;
        }
        let items = seed::default_menu_items();
        if let Err(err) = self.store.put(keys::MENU_ITEMS, &items) {
            tracing::warn!(error = %err, "could not write seed menu");
        }
        items
    }
}
