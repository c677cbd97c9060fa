//! Application context.
//!
//! `TreeHole` is built once at startup and handed to whatever needs the
//! stores. Both stores publish on one event channel and the hole store
//! filters by the division store's selection.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::debug;

use crate::api::ApiClient;
use crate::cache::{CacheManager, SnapshotStore};
use crate::config::Config;
use crate::models::{Division, DivisionId, Hole};
use crate::store::{DivisionSource, DivisionStore, HoleSource, HoleStore, StoreEvent, StoreEvents};

pub struct TreeHole {
    pub divisions: DivisionStore,
    pub holes: HoleStore,
    events: StoreEvents,
}

impl TreeHole {
    pub fn new<S>(source: Arc<S>, snapshots: Arc<dyn SnapshotStore>) -> Self
    where
        S: DivisionSource + HoleSource + 'static,
    {
        let events = StoreEvents::new();
        let divisions = DivisionStore::new(source.clone(), snapshots, events.clone());
        let holes = HoleStore::new(source, divisions.selection(), events.clone());
        Self {
            divisions,
            holes,
            events,
        }
    }

    /// Wire the HTTP client and on-disk snapshots described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut api = ApiClient::new(config.api_base_url())?;
        if let Some(ref token) = config.token {
            api.set_token(token.clone());
        }
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, base_url = api.base_url(), "Building treehole context");
        let snapshots = CacheManager::new(cache_dir)?;
        Ok(Self::new(Arc::new(api), Arc::new(snapshots)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn select_division(&self, division_id: Option<DivisionId>) {
        self.divisions.select(division_id);
    }

    pub async fn current_division(&self) -> Option<Division> {
        self.divisions.current_division().await
    }

    pub async fn current_holes(&self) -> Vec<Hole> {
        self.holes.current_holes().await
    }
}
