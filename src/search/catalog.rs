//! Item catalog aggregation.
//!
//! Three layers feed one id-keyed view:
//! 1. built-in pages, actions, and settings shortcuts;
//! 2. the portal page manifest, filtered by feature flags once they load;
//! 3. dynamically loaded entities (assessments, courses).
//!
//! Later layers win on id collisions, so overlapping sources never produce
//! duplicate entries. Categories are derived from the merged view; until
//! flags load (or when the flag fetch fails) the built-in page set stands.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::model::{ItemKind, SearchCategory, SearchItem};

/// Action id the session turns into a sidebar signal instead of a command
/// dispatch.
pub const SIDEBAR_ACTION_ID: &str = "action-toggle-sidebar";

/// How a manifest page responds to feature flags.
///
/// A key missing from the flag map counts as a failed lookup, and a failed
/// lookup never hides a page.
#[derive(Debug, Clone, Copy)]
pub enum FlagRule {
    Always,
    /// Hidden only when the flag is known to be off.
    UnlessDisabled(&'static str),
    /// Shown only when one of the flags is known to be on.
    RequiresAny(&'static [&'static str]),
}

impl FlagRule {
    fn allows(&self, flags: &HashMap<String, bool>) -> bool {
        match self {
            FlagRule::Always => true,
            FlagRule::UnlessDisabled(key) => flags.get(*key).copied().unwrap_or(true),
            FlagRule::RequiresAny(keys) => {
                if keys.iter().any(|k| !flags.contains_key(*k)) {
                    return true;
                }
                keys.iter().any(|k| flags.get(*k).copied().unwrap_or(false))
            }
        }
    }
}

/// One entry of the portal page manifest.
#[derive(Debug, Clone, Copy)]
pub struct PageDef {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub path: &'static str,
    pub keywords: &'static [&'static str],
    pub rule: FlagRule,
}

/// Every page the portal can navigate to, gated ones included.
pub static PAGE_MANIFEST: &[PageDef] = &[
    PageDef {
        id: "page-home",
        name: "Home",
        icon: "home",
        path: "/",
        keywords: &["dashboard", "landing"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-courses",
        name: "Courses",
        icon: "book-open",
        path: "/courses",
        keywords: &["subjects", "classes"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-assessments",
        name: "Assessments",
        icon: "clipboard",
        path: "/assessments",
        keywords: &["assignments", "homework", "tasks"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-timetable",
        name: "Timetable",
        icon: "calendar",
        path: "/timetable",
        keywords: &["schedule", "lessons"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-notices",
        name: "Notices",
        icon: "bell",
        path: "/notices",
        keywords: &["announcements", "bulletin"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-directory",
        name: "Directory",
        icon: "users",
        path: "/directory",
        keywords: &["people", "staff", "contacts"],
        rule: FlagRule::Always,
    },
    PageDef {
        id: "page-goals",
        name: "Goals",
        icon: "target",
        path: "/goals",
        keywords: &["targets", "progress"],
        rule: FlagRule::UnlessDisabled("goals.enabled"),
    },
    PageDef {
        id: "page-forums",
        name: "Forums",
        icon: "message-square",
        path: "/forums",
        keywords: &["discussions", "community"],
        rule: FlagRule::RequiresAny(&["forums.enabled", "forums.beta"]),
    },
    PageDef {
        id: "page-folios",
        name: "Folios",
        icon: "folder",
        path: "/folios",
        keywords: &["portfolio", "showcase"],
        rule: FlagRule::RequiresAny(&["folios.enabled"]),
    },
    PageDef {
        id: "page-feeds",
        name: "News Feed",
        icon: "rss",
        path: "/feeds",
        keywords: &["rss", "news"],
        rule: FlagRule::UnlessDisabled("settings.rss_separate_feed"),
    },
    PageDef {
        id: "page-settings",
        name: "Settings",
        icon: "settings",
        path: "/settings",
        keywords: &["preferences", "options"],
        rule: FlagRule::Always,
    },
];

fn page_item(def: &PageDef) -> SearchItem {
    SearchItem::new(def.id, def.name, ItemKind::Page, def.path)
        .with_description(format!("Go to {}", def.name))
        .with_icon(def.icon)
        .with_keywords(def.keywords.iter().copied())
        .with_priority(2.0)
}

/// Built-in entries: ungated manifest pages plus actions and settings
/// shortcuts. Gated pages only appear once flags confirm them.
static BUILTIN: Lazy<Vec<SearchItem>> = Lazy::new(|| {
    let mut items: Vec<SearchItem> = PAGE_MANIFEST
        .iter()
        .filter(|def| matches!(def.rule, FlagRule::Always))
        .map(page_item)
        .collect();

    items.extend([
        SearchItem::new(SIDEBAR_ACTION_ID, "Toggle Sidebar", ItemKind::Action, "")
            .with_description("Show or hide the navigation sidebar")
            .with_icon("sidebar")
            .with_keywords(["collapse", "expand", "nav"])
            .with_priority(3.0)
            .with_shortcut("Ctrl+B"),
        SearchItem::new("action-toggle-theme", "Toggle Theme", ItemKind::Action, "")
            .with_description("Switch between light and dark mode")
            .with_icon("moon")
            .with_keywords(["dark", "light", "appearance"])
            .with_priority(3.0),
        SearchItem::new("action-open-settings", "Open Settings", ItemKind::Action, "")
            .with_description("Jump to application settings")
            .with_icon("settings")
            .with_keywords(["preferences", "configure"])
            .with_priority(3.0)
            .with_shortcut("Ctrl+,"),
        SearchItem::new("action-reload-data", "Reload Data", ItemKind::Action, "")
            .with_description("Refresh portal data from the server")
            .with_icon("refresh-cw")
            .with_keywords(["refresh", "sync"])
            .with_priority(3.0),
        SearchItem::new("action-sign-out", "Sign Out", ItemKind::Action, "")
            .with_description("End the current session")
            .with_icon("log-out")
            .with_keywords(["logout", "exit"])
            .with_priority(3.0),
        SearchItem::new("setting-appearance", "Appearance", ItemKind::Setting, "/settings#appearance")
            .with_description("Theme and accent color settings")
            .with_icon("palette")
            .with_keywords(["theme", "color"])
            .with_priority(1.5),
        SearchItem::new(
            "setting-notifications",
            "Notifications",
            ItemKind::Setting,
            "/settings#notifications",
        )
        .with_description("Notification preferences")
        .with_icon("bell")
        .with_keywords(["alerts", "push"])
        .with_priority(1.5),
        SearchItem::new("setting-account", "Account", ItemKind::Setting, "/settings#account")
            .with_description("Profile and sign-in settings")
            .with_icon("user")
            .with_keywords(["profile", "password"])
            .with_priority(1.5),
    ]);
    items
});

/// Derive the flag-filtered page list from a fetched flag map.
pub fn pages_from_flags(flags: &HashMap<String, bool>) -> Vec<SearchItem> {
    PAGE_MANIFEST
        .iter()
        .filter(|def| def.rule.allows(flags))
        .map(page_item)
        .collect()
}

/// Aggregated, id-deduplicated item view over all layers.
#[derive(Debug)]
pub struct Catalog {
    builtin: Vec<SearchItem>,
    pages: Option<Vec<SearchItem>>,
    dynamic: Vec<SearchItem>,
    /// Session-local selection deltas: id -> (extra uses, last used millis).
    usage: HashMap<String, (u32, i64)>,
    merged: Vec<SearchItem>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            builtin: BUILTIN.clone(),
            pages: None,
            dynamic: Vec::new(),
            usage: HashMap::new(),
            merged: Vec::new(),
        };
        catalog.rebuild();
        catalog
    }

    /// Install the flag-filtered page list, or `None` when the flag fetch
    /// failed and the built-in set should stand.
    pub fn set_pages(&mut self, pages: Option<Vec<SearchItem>>) {
        self.pages = pages;
        self.rebuild();
    }

    /// Replace the dynamically loaded entity layer.
    pub fn set_dynamic(&mut self, items: Vec<SearchItem>) {
        self.dynamic = items;
        self.rebuild();
    }

    pub fn clear_dynamic(&mut self) {
        if !self.dynamic.is_empty() {
            self.dynamic.clear();
            self.rebuild();
        }
    }

    /// Record a selection so the usage boost is visible immediately.
    pub fn note_usage(&mut self, id: &str, at_millis: i64) {
        let entry = self.usage.entry(id.to_string()).or_insert((0, at_millis));
        entry.0 += 1;
        entry.1 = at_millis;
        self.rebuild();
    }

    pub fn items(&self) -> &[SearchItem] {
        &self.merged
    }

    pub fn get(&self, id: &str) -> Option<&SearchItem> {
        self.merged.iter().find(|item| item.id == id)
    }

    /// Category browser view: pages, actions, settings, in that order.
    /// Entity items never form a category.
    pub fn categories(&self) -> Vec<SearchCategory> {
        let group = |kind: ItemKind| -> Vec<SearchItem> {
            self.merged
                .iter()
                .filter(|item| item.category == kind)
                .cloned()
                .collect()
        };
        vec![
            SearchCategory::new("pages", "Pages", "layout").with_items(group(ItemKind::Page)),
            SearchCategory::new("actions", "Actions", "zap").with_items(group(ItemKind::Action)),
            SearchCategory::new("settings", "Settings", "settings")
                .with_items(group(ItemKind::Setting)),
        ]
    }

    pub fn category(&self, id: &str) -> Option<SearchCategory> {
        self.categories().into_iter().find(|cat| cat.id == id)
    }

    /// Last-write-wins merge: first occurrence fixes the position, the
    /// latest layer fixes the value.
    fn rebuild(&mut self) {
        let mut merged: Vec<SearchItem> = Vec::with_capacity(self.builtin.len() + self.dynamic.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        let layers = self
            .builtin
            .iter()
            .chain(self.pages.iter().flatten())
            .chain(self.dynamic.iter());
        for item in layers {
            match index.get(&item.id) {
                Some(&pos) => merged[pos] = item.clone(),
                None => {
                    index.insert(item.id.clone(), merged.len());
                    merged.push(item.clone());
                }
            }
        }

        for item in &mut merged {
            if let Some(&(extra, at)) = self.usage.get(&item.id) {
                item.use_count += extra;
                item.last_used = Some(at);
            }
        }
        self.merged = merged;
    }
}
