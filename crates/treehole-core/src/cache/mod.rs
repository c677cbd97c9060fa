//! Local snapshot persistence.
//!
//! Snapshots are opaque JSON documents addressed by a string key. The
//! `SnapshotStore` trait is the read/write contract used by the stores;
//! `CacheManager` writes one file per key under the cache directory and
//! `MemorySnapshots` keeps them in memory.
//!
//! Every snapshot is wrapped in `CachedData`, which records when it was
//! written so callers can show its age.

pub mod manager;

pub use manager::{load_cached, save_cached, CacheManager, CachedData, MemorySnapshots, SnapshotStore};
