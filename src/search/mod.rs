//! Search layer facade.
//!
//! This module provides the matching and ranking infrastructure:
//!
//! - **[`fuzzy`]**: Pure two-band query scorer (substring, then subsequence).
//! - **[`rank`]**: Result ranking/filtering for every palette view.
//! - **[`catalog`]**: Built-in tables, the flag-gated page manifest, and the
//!   layered id-deduplicating aggregate view.

pub mod catalog;
pub mod fuzzy;
pub mod rank;

pub use catalog::{Catalog, PAGE_MANIFEST, SIDEBAR_ACTION_ID, pages_from_flags};
pub use rank::{RankContext, USE_COUNT_WEIGHT, rank, weight};
