//! Data models for treehole entities.
//!
//! - `Division`: a forum section, cached as a flat list
//! - `Hole`: a thread inside a division, cached page by page
//! - `Tag`, `TagFilter`: thread categories and the filter used when paging

pub mod division;
pub mod hole;

pub use division::{Division, DivisionId};
pub use hole::{Hole, HoleId, Tag, TagFilter};
