//! In-memory stores backing the presentation layer.
//!
//! - `HoleStore`: per-division hole timelines extended page by page
//! - `DivisionStore`: the flat division list, restored from a snapshot and
//!   then replaced by a fresh fetch
//! - `Selection`: the currently selected division
//!
//! Stores never push state into consumers. Consumers read through accessors
//! and may subscribe to `StoreEvent`s, which are sent once a mutation has
//! fully completed.

pub mod division;
pub mod events;
pub mod hole;
pub mod paginated;
pub mod selection;
pub mod source;

pub use division::{DivisionStore, DIVISIONS_SNAPSHOT};
pub use events::{StoreEvent, StoreEvents};
pub use hole::HoleStore;
pub use paginated::{MergeStats, PagedList, TimelineRecord};
pub use selection::{Selection, SelectionHandle};
pub use source::{DivisionSource, HoleSource};
