use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Read/write contract for persisted snapshots.
///
/// Implementations only move strings around; callers own the format.
pub trait SnapshotStore: Send + Sync {
    fn load_snapshot(&self, key: &str) -> Result<Option<String>>;

    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()>;
}

/// Load and decode a snapshot. A snapshot that fails to parse is an error
/// here; the stores decide to treat it as missing.
pub fn load_cached<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<CachedData<T>>> {
    let Some(contents) = store.load_snapshot(key)? else {
        return Ok(None);
    };
    let cached: CachedData<T> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot: {}", key))?;
    Ok(Some(cached))
}

pub fn save_cached<T: Serialize>(store: &dyn SnapshotStore, key: &str, data: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(&CachedData::new(data))?;
    store.save_snapshot(key, &contents)
}

/// File-backed snapshots, one `<key>.json` per snapshot.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }
}

impl SnapshotStore for CacheManager {
    fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", key))?;
        Ok(Some(contents))
    }

    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.cache_path(key);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", key))?;
        debug!(cache = key, bytes = contents.len(), "Snapshot written");
        Ok(())
    }
}

/// In-process snapshots, for tests and for running without a cache directory.
#[derive(Default)]
pub struct MemorySnapshots {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("snapshot lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("snapshot lock poisoned"))?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
