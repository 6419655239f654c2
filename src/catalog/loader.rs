use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::notion::types::{FieldSchema, SourceDatabase};
use crate::notion::ContentStore;
use crate::schema::{normalize, Item};

/// Normalized view of one source database at fetch time.
///
/// A failed fetch produces a snapshot with no items and the failure message
/// in `error`; consumers treat it exactly like an empty database.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSnapshot {
    pub database_id: String,
    pub title: String,
    pub fields: Vec<FieldSchema>,
    pub items: Vec<Item>,
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl SourceSnapshot {
    pub fn from_database(database_id: &str, database: SourceDatabase) -> Self {
        Self {
            database_id: database_id.to_string(),
            title: database.title,
            fields: database.fields,
            items: database.rows.iter().map(normalize).collect(),
            error: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn failed(database_id: &str, message: impl Into<String>) -> Self {
        Self {
            database_id: database_id.to_string(),
            title: String::new(),
            fields: Vec::new(),
            items: Vec::new(),
            error: Some(message.into()),
            fetched_at: Utc::now(),
        }
    }

    /// Errored snapshots are never fresh, so the next request retries them.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.error.is_none() && now - self.fetched_at < max_age
    }
}

/// Source snapshots keyed by database id.
///
/// Results are merged by key only, so a late result for a course nobody is
/// looking at any more just sits in the cache.
#[derive(Default)]
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, Arc<SourceSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry. Returns how many were held.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    /// Snapshots for every requested id, fetching stale or missing ones.
    ///
    /// Duplicate ids are fetched once. Fetches run concurrently; one
    /// failure becomes that id's errored snapshot and does not affect the
    /// others. The cache is only written after every fetch has settled.
    pub async fn load<'a, S: ContentStore>(
        &self,
        store: &S,
        database_ids: impl IntoIterator<Item = &'a str>,
        max_age: Duration,
    ) -> HashMap<String, Arc<SourceSnapshot>> {
        let wanted: BTreeSet<&str> = database_ids.into_iter().filter(|id| !id.is_empty()).collect();
        let now = Utc::now();

        let mut result = HashMap::new();
        let mut missing = Vec::new();
        {
            let entries = self.entries.read().await;
            for id in &wanted {
                match entries.get(*id) {
                    Some(snapshot) if snapshot.is_fresh(max_age, now) => {
                        result.insert(id.to_string(), snapshot.clone());
                    }
                    _ => missing.push(*id),
                }
            }
        }

        if missing.is_empty() {
            debug!(cached = result.len(), "all source snapshots fresh");
            return result;
        }

        info!(fetching = missing.len(), cached = result.len(), "loading source databases");
        let fetched = join_all(missing.iter().map(|id| async move {
            match store.fetch_source_database(id).await {
                Ok(database) => SourceSnapshot::from_database(id, database),
                Err(e) => {
                    warn!(database_id = id, error = %e, "source database fetch failed");
                    SourceSnapshot::failed(id, format!("{:#}", e))
                }
            }
        }))
        .await;

        let mut entries = self.entries.write().await;
        for snapshot in fetched {
            let snapshot = Arc::new(snapshot);
            entries.insert(snapshot.database_id.clone(), snapshot.clone());
            result.insert(snapshot.database_id.clone(), snapshot);
        }
        result
    }

    /// Snapshot for a single id. Always yields one; an id that cannot be
    /// fetched comes back as an errored snapshot.
    pub async fn load_one<S: ContentStore>(
        &self,
        store: &S,
        database_id: &str,
        max_age: Duration,
    ) -> Arc<SourceSnapshot> {
        let mut loaded = self.load(store, [database_id], max_age).await;
        loaded
            .remove(database_id)
            .unwrap_or_else(|| Arc::new(SourceSnapshot::failed(database_id, "no database id")))
    }
}
