//! Time-ordered, de-duplicated record lists extended one page at a time.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// A record that can live in a `PagedList`.
pub trait TimelineRecord {
    type Id: PartialEq + Copy + Debug;

    fn record_id(&self) -> Self::Id;

    fn updated_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records not previously held.
    pub inserted: usize,
    /// Records that superseded an existing copy with the same id.
    pub replaced: usize,
}

/// Records ordered newest first, with at most one record per id.
#[derive(Debug, Clone)]
pub struct PagedList<R> {
    records: Vec<R>,
}

impl<R> Default for PagedList<R> {
    fn default() -> Self {
        Self { records: Vec::new() }
    }
}

impl<R: TimelineRecord> PagedList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn oldest(&self) -> Option<&R> {
        self.records.last()
    }

    /// Where the next page should start: the oldest held record's timestamp,
    /// or `now` when nothing is held yet.
    pub fn cursor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.oldest().map(|r| r.updated_at()).unwrap_or(now)
    }

    /// Merge a fetched page.
    ///
    /// A fetched record always replaces a held record with the same id, even
    /// when its timestamp moved. The list is re-sorted newest first afterwards;
    /// equal timestamps keep their relative order.
    pub fn merge(&mut self, page: Vec<R>) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in page {
            let id = record.record_id();
            match self.records.iter().position(|r| r.record_id() == id) {
                Some(index) => {
                    self.records.remove(index);
                    stats.replaced += 1;
                }
                None => stats.inserted += 1,
            }
            self.records.push(record);
        }
        self.records.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        stats
    }
}
