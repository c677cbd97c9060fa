//! The flat division list.
//!
//! `refresh` first restores the last persisted snapshot so something can be
//! shown immediately, then replaces it with the list fetched from the
//! server and persists that. The division store also owns the selection.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{load_cached, save_cached, CachedData, SnapshotStore};
use crate::models::{Division, DivisionId};

use super::{DivisionSource, Selection, SelectionHandle, StoreEvent, StoreEvents};

/// Snapshot key of the persisted division list.
pub const DIVISIONS_SNAPSHOT: &str = "divisions";

pub struct DivisionStore {
    source: Arc<dyn DivisionSource>,
    snapshots: Arc<dyn SnapshotStore>,
    divisions: RwLock<Vec<Division>>,
    selection: Selection,
    events: StoreEvents,
}

impl DivisionStore {
    pub fn new(
        source: Arc<dyn DivisionSource>,
        snapshots: Arc<dyn SnapshotStore>,
        events: StoreEvents,
    ) -> Self {
        Self {
            source,
            snapshots,
            divisions: RwLock::new(Vec::new()),
            selection: Selection::default(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn divisions(&self) -> Vec<Division> {
        self.divisions.read().await.clone()
    }

    /// Restore the snapshot (if any), then replace it with a fresh fetch.
    ///
    /// The restored snapshot is not written back, so its `cached_at` keeps
    /// reporting when the list was last fetched. A fetch failure is
    /// returned; whatever the snapshot restored stays.
    pub async fn refresh(&self) -> Result<()> {
        if let Some(cached) = self.load_snapshot() {
            debug!(count = cached.data.len(), age = %cached.age_display(), "Restoring cached divisions");
            self.replace(cached.data).await;
        }

        let fresh = self
            .source
            .list_divisions()
            .await
            .context("Failed to fetch divisions")?;
        info!(count = fresh.len(), "Fetched divisions");

        self.persist(&fresh);
        self.replace(fresh).await;
        Ok(())
    }

    /// Age of the persisted snapshot for display, if there is one.
    pub fn snapshot_age(&self) -> Option<String> {
        self.load_snapshot().map(|cached| cached.age_display())
    }

    /// Unreadable or malformed snapshots count as missing.
    fn load_snapshot(&self) -> Option<CachedData<Vec<Division>>> {
        match load_cached(self.snapshots.as_ref(), DIVISIONS_SNAPSHOT) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "Ignoring unusable division snapshot");
                None
            }
        }
    }

    fn persist(&self, divisions: &[Division]) {
        if let Err(e) = save_cached(self.snapshots.as_ref(), DIVISIONS_SNAPSHOT, &divisions) {
            warn!(error = %e, "Failed to cache divisions");
        }
    }

    async fn replace(&self, divisions: Vec<Division>) {
        *self.divisions.write().await = divisions;
        self.events.emit(StoreEvent::DivisionsChanged);
    }

    // ===== Selection =====

    pub fn select(&self, division_id: Option<DivisionId>) {
        if self.selection.select(division_id) {
            debug!(?division_id, "Division selected");
            self.events.emit(StoreEvent::SelectionChanged(division_id));
        }
    }

    pub fn selected_id(&self) -> Option<DivisionId> {
        self.selection.current()
    }

    /// Read-only selection for stores that filter by division.
    pub fn selection(&self) -> SelectionHandle {
        self.selection.handle()
    }

    /// The selected division, if one is selected and present in the list.
    pub async fn current_division(&self) -> Option<Division> {
        let id = self.selection.current()?;
        self.divisions.read().await.iter().find(|d| d.id == id).cloned()
    }
}
