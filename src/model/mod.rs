//! Shared palette domain model.

pub mod types;

pub use types::{
    BADGE_COURSE, BADGE_FAVORITE, BADGE_OVERDUE, BADGE_RECENT, COMMAND_SENTINEL, ItemKind,
    SearchCategory, SearchItem, SearchMode,
};
