//! Result ranking and filtering.
//!
//! One entry point, [`rank`], covers every view the palette can show:
//! the default (empty-query) view assembled from favorites, recents, and
//! homepage suggestions; verbatim category listings; and the fuzzy, normal,
//! and command matching paths. Match paths share a post-filter stable sort
//! by `priority + use_count * 0.1`, then the cap.

use std::collections::HashSet;

use crate::config::SearchConfig;
use crate::model::{BADGE_FAVORITE, BADGE_RECENT, ItemKind, SearchItem, SearchMode};
use crate::search::fuzzy;

/// Weight each recorded selection adds on top of an item's base priority.
pub const USE_COUNT_WEIGHT: f32 = 0.1;

/// Ranking inputs beyond the candidate pool.
pub struct RankContext<'a> {
    /// Resolved favorite items, insertion order.
    pub favorites: &'a [SearchItem],
    /// Most recent selections, newest first.
    pub recents: &'a [SearchItem],
    /// Up to two homepage suggestion lists, shown after recents.
    pub suggestions: [&'a [SearchItem]; 2],
    /// True while the user has drilled into a category.
    pub in_category: bool,
}

impl<'a> RankContext<'a> {
    pub fn empty() -> Self {
        Self {
            favorites: &[],
            recents: &[],
            suggestions: [&[], &[]],
            in_category: false,
        }
    }
}

/// Effective ranking weight of an item.
pub fn weight(item: &SearchItem) -> f32 {
    item.priority + item.use_count as f32 * USE_COUNT_WEIGHT
}

/// Produce the displayed result list for the current inputs.
///
/// `items` is the candidate pool: the full aggregated catalog at top level,
/// or the drilled-into category's items. `query` is the sanitized effective
/// query with any command sentinel already stripped.
pub fn rank(
    items: &[SearchItem],
    query: &str,
    mode: SearchMode,
    ctx: &RankContext<'_>,
    config: &SearchConfig,
) -> Vec<SearchItem> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        if ctx.in_category {
            // Verbatim, unfiltered and uncapped.
            return items.to_vec();
        }
        return match mode {
            SearchMode::Normal => default_view(ctx, config),
            SearchMode::Command => {
                let actions: Vec<SearchItem> = items
                    .iter()
                    .filter(|item| item.category == ItemKind::Action)
                    .cloned()
                    .collect();
                capped(actions, config)
            }
            SearchMode::Fuzzy => capped(post_sorted(items.to_vec()), config),
        };
    }

    let pool: Vec<&SearchItem> = if mode == SearchMode::Command {
        items.iter().filter(|item| item.category == ItemKind::Action).collect()
    } else {
        items.iter().collect()
    };

    let matched: Vec<SearchItem> = match mode {
        SearchMode::Fuzzy => {
            let mut scored: Vec<(f32, &SearchItem)> = pool
                .iter()
                .map(|item| (fuzzy::score_item(trimmed, item), *item))
                .filter(|(score, _)| *score > config.fuzzy_threshold)
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            scored.into_iter().map(|(_, item)| item.clone()).collect()
        }
        SearchMode::Normal | SearchMode::Command => {
            let needle = trimmed.to_lowercase();
            pool.iter()
                .filter(|item| substring_matches(&needle, item))
                .map(|item| (*item).clone())
                .collect()
        }
    };

    capped(post_sorted(matched), config)
}

/// Favorites, then recents, then homepage suggestions: insertion order,
/// id-deduplicated (first occurrence wins), capped.
fn default_view(ctx: &RankContext<'_>, config: &SearchConfig) -> Vec<SearchItem> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<SearchItem> = Vec::new();

    for item in ctx.favorites {
        if seen.insert(item.id.as_str()) {
            out.push(item.clone().with_badge(BADGE_FAVORITE));
        }
    }
    for item in ctx.recents {
        if seen.insert(item.id.as_str()) {
            out.push(item.clone().with_badge(BADGE_RECENT));
        }
    }
    for list in ctx.suggestions {
        for item in list {
            if seen.insert(item.id.as_str()) {
                out.push(item.clone());
            }
        }
    }

    out.truncate(config.result_cap);
    out
}

/// Case-insensitive substring test over name, description, keywords, and
/// the navigation path.
fn substring_matches(needle: &str, item: &SearchItem) -> bool {
    item.match_fields()
        .chain(std::iter::once(item.path.as_str()))
        .any(|field| field.to_lowercase().contains(needle))
}

fn post_sorted(mut items: Vec<SearchItem>) -> Vec<SearchItem> {
    // sort_by is stable: ties keep score order (fuzzy) or pool order.
    items.sort_by(|a, b| weight(b).total_cmp(&weight(a)));
    items
}

fn capped(mut items: Vec<SearchItem>, config: &SearchConfig) -> Vec<SearchItem> {
    items.truncate(config.result_cap);
    items
}
