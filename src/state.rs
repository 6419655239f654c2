use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::loader::SnapshotCache;
use crate::catalog::Catalog;
use crate::notion::NotionClient;

/// Display parameters admins can change at runtime.
pub struct ShowcaseConfig {
    /// Items rendered per project.
    pub max_items: u32,
    /// Age after which cached catalog and source snapshots are fetched again.
    pub cache_ttl_secs: u32,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            max_items: 24,
            cache_ttl_secs: 300,
        }
    }
}

/// Upper bound for `max_items`.
pub const MAX_ITEMS_LIMIT: u32 = 100;

/// A runtime-adjustable display parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Setting {
    #[name = "max_items"]
    MaxItems,
    #[name = "cache_ttl_secs"]
    CacheTtlSecs,
}

impl Setting {
    pub fn key(self) -> &'static str {
        match self {
            Setting::MaxItems => "max_items",
            Setting::CacheTtlSecs => "cache_ttl_secs",
        }
    }
}

impl ShowcaseConfig {
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.cache_ttl_secs))
    }

    /// Apply one setting, rejecting values the renderer cannot use.
    pub fn set(&mut self, setting: Setting, value: u32) -> anyhow::Result<()> {
        match setting {
            Setting::MaxItems => {
                if !(1..=MAX_ITEMS_LIMIT).contains(&value) {
                    anyhow::bail!("`max_items` must be between 1 and {}", MAX_ITEMS_LIMIT);
                }
                self.max_items = value;
            }
            Setting::CacheTtlSecs => self.cache_ttl_secs = value,
        }
        Ok(())
    }
}

impl fmt::Display for ShowcaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Showcase settings**")?;
        writeln!(f, "`max_items` = {} (items per project view)", self.max_items)?;
        write!(
            f,
            "`cache_ttl_secs` = {} (Notion reload interval; 0 reloads every time)",
            self.cache_ttl_secs
        )
    }
}

struct CachedCatalog {
    loaded_at: DateTime<Utc>,
    catalog: Arc<Catalog>,
}

pub struct AppState {
    pub notion: Arc<NotionClient>,
    pub snapshots: Arc<SnapshotCache>,
    /// Base URL written back to each course's `CourseLink`.
    pub site_base_url: Option<String>,
    pub admin_ids: HashSet<u64>,
    pub config: Arc<RwLock<ShowcaseConfig>>,
    catalog: RwLock<Option<CachedCatalog>>,
}

impl AppState {
    pub fn new(
        notion: Arc<NotionClient>,
        site_base_url: Option<String>,
        admin_ids: HashSet<u64>,
    ) -> Self {
        Self {
            notion,
            snapshots: Arc::new(SnapshotCache::new()),
            site_base_url,
            admin_ids,
            config: Arc::new(RwLock::new(ShowcaseConfig::default())),
            catalog: RwLock::new(None),
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Published courses and projects, reloaded once older than the cache TTL.
    pub async fn catalog(&self) -> anyhow::Result<Arc<Catalog>> {
        let ttl = self.config.read().await.cache_ttl();
        if let Some(cached) = self.catalog.read().await.as_ref() {
            if Utc::now() - cached.loaded_at < ttl {
                return Ok(cached.catalog.clone());
            }
        }

        let catalog = Arc::new(Catalog::load(self.notion.as_ref()).await?);
        *self.catalog.write().await = Some(CachedCatalog {
            loaded_at: Utc::now(),
            catalog: catalog.clone(),
        });
        Ok(catalog)
    }

    /// Forget the cached catalog and every source snapshot.
    pub async fn invalidate(&self) -> usize {
        *self.catalog.write().await = None;
        let dropped = self.snapshots.clear().await;
        debug!(dropped, "caches invalidated");
        dropped
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
