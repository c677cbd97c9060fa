//! Per-division hole timelines.
//!
//! Each division owns a `PagedList<Hole>` that grows towards older holes
//! with every `sync_page`. `sync_page` calls for the same division run one
//! at a time, so each page is requested from the state the previous call
//! left behind. Calls for different divisions do not wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};

use crate::models::{DivisionId, Hole, TagFilter};

use super::{HoleSource, PagedList, SelectionHandle, StoreEvent, StoreEvents};

pub struct HoleStore {
    source: Arc<dyn HoleSource>,
    partitions: RwLock<HashMap<DivisionId, PagedList<Hole>>>,
    sync_locks: Mutex<HashMap<DivisionId, Arc<Mutex<()>>>>,
    selection: SelectionHandle,
    events: StoreEvents,
}

impl HoleStore {
    pub fn new(source: Arc<dyn HoleSource>, selection: SelectionHandle, events: StoreEvents) -> Self {
        Self {
            source,
            partitions: RwLock::new(HashMap::new()),
            sync_locks: Mutex::new(HashMap::new()),
            selection,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn sync_lock(&self, division_id: DivisionId) -> Arc<Mutex<()>> {
        let mut locks = self.sync_locks.lock().await;
        Arc::clone(locks.entry(division_id).or_default())
    }

    /// Fetch the next older page of a division and merge it.
    ///
    /// Returns `Ok(false)` when the source had nothing more, leaving the
    /// division untouched. Source errors are returned as-is and also leave
    /// it untouched.
    pub async fn sync_page(
        &self,
        division_id: DivisionId,
        page_size: usize,
        tag: Option<&TagFilter>,
    ) -> Result<bool> {
        let lock = self.sync_lock(division_id).await;
        let _guard = lock.lock().await;

        let cursor = {
            let mut partitions = self.partitions.write().await;
            partitions.entry(division_id).or_default().cursor(Utc::now())
        };
        debug!(division_id, %cursor, page_size, tag = ?tag.map(|t| t.query_value()), "Fetching hole page");

        let page = self
            .source
            .list_holes(division_id, cursor, page_size, tag)
            .await
            .with_context(|| format!("Failed to fetch holes for division {}", division_id))?;

        if page.is_empty() {
            debug!(division_id, "No older holes");
            return Ok(false);
        }

        let fetched = page.len();
        let (stats, total) = {
            let mut partitions = self.partitions.write().await;
            let list = partitions.entry(division_id).or_default();
            let stats = list.merge(page);
            (stats, list.len())
        };
        info!(
            division_id,
            fetched,
            inserted = stats.inserted,
            replaced = stats.replaced,
            total,
            "Merged hole page"
        );

        self.events.emit(StoreEvent::HolesChanged(division_id));
        Ok(true)
    }

    /// Holes of the selected division; empty when nothing is selected or
    /// that division was never synced.
    pub async fn current_holes(&self) -> Vec<Hole> {
        match self.selection.current() {
            Some(division_id) => self.holes(division_id).await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// `None` until the first `sync_page` for the division.
    pub async fn holes(&self, division_id: DivisionId) -> Option<Vec<Hole>> {
        let partitions = self.partitions.read().await;
        partitions.get(&division_id).map(|list| list.records().to_vec())
    }

    pub async fn len(&self, division_id: DivisionId) -> usize {
        let partitions = self.partitions.read().await;
        partitions.get(&division_id).map(PagedList::len).unwrap_or(0)
    }

    pub async fn has_division(&self, division_id: DivisionId) -> bool {
        self.partitions.read().await.contains_key(&division_id)
    }
}
