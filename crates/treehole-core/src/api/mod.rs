//! REST API client module for the treehole forum service.
//!
//! This module provides the `ApiClient`, which fetches divisions and
//! paginated hole listings. It implements the `DivisionSource` and
//! `HoleSource` traits consumed by the stores.
//!
//! Requests carry an optional JWT bearer token.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
