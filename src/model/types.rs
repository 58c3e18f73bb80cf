//! Palette entity structs.

use serde::{Deserialize, Serialize};

/// Badge shown on favorited items in the default view.
pub const BADGE_FAVORITE: &str = "Favorite";
/// Badge shown on recently selected items in the default view.
pub const BADGE_RECENT: &str = "Recent";
/// Badge shown on assessments whose due date has passed.
pub const BADGE_OVERDUE: &str = "Overdue";
/// Badge shown on active-course suggestions in the default view.
pub const BADGE_COURSE: &str = "Course";

/// Leading character that switches the palette into command mode.
pub const COMMAND_SENTINEL: char = '>';

/// What selecting an item does, and which source produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Page,
    Action,
    Setting,
    Assessment,
    Course,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Page => "page",
            ItemKind::Action => "action",
            ItemKind::Setting => "setting",
            ItemKind::Assessment => "assessment",
            ItemKind::Course => "course",
        }
    }
}

/// Matching behavior of the palette.
///
/// `Command` is derived from a leading [`COMMAND_SENTINEL`] in the query;
/// `Fuzzy` is an explicit toggle. `Normal` is the only non-override mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Normal,
    Command,
    Fuzzy,
}

impl SearchMode {
    /// True for modes that replace the category browser with a result list
    /// even when the query is empty.
    pub fn is_override(&self) -> bool {
        !matches!(self, SearchMode::Normal)
    }
}

/// One selectable palette entry.
///
/// Dynamic entities carry composite ids (`assessment-{id}-{metaclass}`,
/// `course-{programme}-{metaclass}`) so reloads dedup against earlier loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ItemKind,
    #[serde(default)]
    pub icon: String,
    /// Navigation target; unused for action items, which dispatch by id.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub priority: f32,
    #[serde(default)]
    pub use_count: u32,
    /// Epoch millis of the most recent selection.
    #[serde(default)]
    pub last_used: Option<i64>,
    #[serde(default)]
    pub badge: Option<String>,
    /// Display-only accelerator, `+`-delimited (e.g. "Ctrl+K").
    #[serde(default)]
    pub shortcut: Option<String>,
    /// Opaque payload passed through to the embedder untouched.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl SearchItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ItemKind,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            icon: String::new(),
            path: path.into(),
            keywords: Vec::new(),
            priority: 0.0,
            use_count: 0,
            last_used: None,
            badge: None,
            shortcut: None,
            metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Fields consulted by the matchers, in display-priority order.
    pub fn match_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(std::iter::once(self.description.as_str()))
            .chain(self.keywords.iter().map(String::as_str))
    }
}

/// Browsable grouping shown when no query is active and no mode override
/// is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub items: Vec<SearchItem>,
}

impl SearchCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<SearchItem>) -> Self {
        self.items = items;
        self
    }
}
