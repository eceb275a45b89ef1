pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::admin::AdminService;
use crate::app::comments::CommentService;
use crate::app::engagement::EngagementService;
use crate::app::feed::FeedService;
use crate::app::media::MediaService;
use crate::app::menus::MenuService;
use crate::app::posts::PostService;
use crate::app::taxonomy::TaxonomyService;
use crate::app::users::UserService;
use crate::config::AppConfig;
use crate::infra::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub page_size: usize,
    pub max_image_bytes: usize,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = match &config.data_path {
            Some(path) => Store::open(path.clone()).await?,
            None => Store::in_memory(),
        };
        Ok(Self {
            store: store.with_latency(config.simulated_latency_ms),
            page_size: config.page_size,
            max_image_bytes: config.max_image_bytes,
        })
    }

    /// In-memory state with default settings; the usual entry point for
    /// tests and embedding.
    pub fn in_memory() -> Self {
        let config = AppConfig::default();
        Self {
            store: Store::in_memory(),
            page_size: config.page_size,
            max_image_bytes: config.max_image_bytes,
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.store.clone())
    }

    pub fn feed(&self) -> FeedService {
        FeedService::new(self.store.clone(), self.page_size)
    }

    pub fn engagement(&self) -> EngagementService {
        EngagementService::new(self.store.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store.clone())
    }

    pub fn taxonomy(&self) -> TaxonomyService {
        TaxonomyService::new(self.store.clone())
    }

    pub fn menus(&self) -> MenuService {
        MenuService::new(self.store.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.store.clone())
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(self.max_image_bytes)
    }
}

/// Install the process-wide tracing subscriber. Call once from the host
/// application.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
