use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Well-known store keys. The names are the persisted layout and must not
/// change without a data migration.
pub mod keys {
    use uuid::Uuid;

    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const USERS: &str = "users";
    pub const CATEGORIES: &str = "categories";
    pub const TAGS: &str = "tags";
    pub const INTERACTIONS: &str = "userInteractions";
    // Legacy key name, kept for data written by earlier menu revisions.
    pub const MENU_ITEMS: &str = "cms-menu-items-v2";
    pub const CURRENT_USER: &str = "user";
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const SETTINGS: &str = "site-settings";
    pub const ERROR_LOGS: &str = "errorLogs";

    /// Per-post draft key; `None` is the unsaved "write a new post" draft.
    pub fn draft(post_id: Option<Uuid>) -> String {
        match post_id {
            Some(id) => format!("draft:{}", id),
            None => "draft:new".to_string(),
        }
    }
}

const ERROR_LOG_CAP: usize = 100;

/// One entry of the bounded `errorLogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLog {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub source: String,
    pub message: String,
}

/// JSON key-value store standing in for browser local storage.
///
/// Values are JSON text; typed access goes through [`Store::get`] /
/// [`Store::put`]. A value that fails to parse is logged and treated as
/// absent, never an error. Each item operation takes the lock once, so
/// same-process callers serialize; there is no cross-operation transaction.
#[derive(Clone)]
pub struct Store {
    entries: Arc<RwLock<HashMap<String, String>>>,
    path: Option<PathBuf>,
    latency: Duration,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            path: None,
            latency: Duration::ZERO,
        }
    }

    /// Open a file-backed store. A missing file starts empty; an unreadable
    /// or corrupt file is logged and also starts empty.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "store file corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "store file unreadable, starting empty");
                HashMap::new()
            }
        };

        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
            path: Some(path),
            latency: Duration::ZERO,
        })
    }

    /// Fixed artificial delay applied by [`Store::lag`], standing in for
    /// network latency.
    pub fn with_latency(mut self, millis: u64) -> Self {
        self.latency = Duration::from_millis(millis);
        self
    }

    pub async fn lag(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        self.write().insert(key.to_string(), value.into());
    }

    pub fn remove_item(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Parse the value under `key`. A malformed value is recorded in the
    /// error log and reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value unparseable, using fallback");
                self.record_error(key, &err.to_string());
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: impl FnOnce() -> T) -> T {
        self.get(key).unwrap_or_else(fallback)
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("serialize {}", key))?;
        self.set_item(key, raw);
        Ok(())
    }

    /// Append to the bounded `errorLogs` collection. Parses the raw value
    /// directly so a corrupt log cannot recurse back into itself.
    pub fn record_error(&self, source: &str, message: &str) {
        let mut guard = self.write();
        let mut logs: Vec<ErrorLog> = guard
            .get(keys::ERROR_LOGS)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        logs.push(ErrorLog {
            at: OffsetDateTime::now_utc(),
            source: source.to_string(),
            message: message.to_string(),
        });
        if logs.len() > ERROR_LOG_CAP {
            let excess = logs.len() - ERROR_LOG_CAP;
            logs.drain(..excess);
        }
        if let Ok(raw) = serde_json::to_string(&logs) {
            guard.insert(keys::ERROR_LOGS.to_string(), raw);
        }
    }

    pub fn error_logs(&self) -> Vec<ErrorLog> {
        self.read()
            .get(keys::ERROR_LOGS)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Full copy of the raw entry map, for backup export.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.read().clone()
    }

    /// Replace every entry, for backup restore.
    pub fn replace_all(&self, entries: HashMap<String, String>) {
        *self.write() = entries;
    }

    /// Write the whole map to the backing file, if one is configured.
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = {
            let guard = self.read();
            serde_json::to_vec_pretty(&*guard).context("serialize store")?
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), "store persisted");
        Ok(())
    }
}
