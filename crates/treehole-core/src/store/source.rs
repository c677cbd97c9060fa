//! Boundaries the stores fetch through.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Division, DivisionId, Hole, TagFilter};

/// Supplies the complete division list.
#[async_trait]
pub trait DivisionSource: Send + Sync {
    async fn list_divisions(&self) -> Result<Vec<Division>>;
}

/// Supplies holes of one division, page by page.
///
/// Returns at most `size` holes updated before `before`, in any order.
/// An empty page means there is nothing older to fetch.
#[async_trait]
pub trait HoleSource: Send + Sync {
    async fn list_holes(
        &self,
        division_id: DivisionId,
        before: DateTime<Utc>,
        size: usize,
        tag: Option<&TagFilter>,
    ) -> Result<Vec<Hole>>;
}
