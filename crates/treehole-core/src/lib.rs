//! Client-side state for the treehole forum.
//!
//! Divisions are cached as a flat list restored from a local snapshot and
//! refreshed from the server. Holes are cached per division as a newest-first
//! timeline that grows one page at a time towards older holes.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use app::TreeHole;
pub use cache::{CacheManager, CachedData, MemorySnapshots, SnapshotStore};
pub use config::Config;
pub use models::{Division, DivisionId, Hole, HoleId, Tag, TagFilter};
pub use store::{DivisionStore, HoleStore, StoreEvent};
