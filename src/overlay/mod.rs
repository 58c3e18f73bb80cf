//! Overlay session: one struct that ties navigation state, the item
//! catalog, ranking, the dynamic loader and persisted user data behind a
//! single event interface.
//!
//! The embedding shell forwards key events and UI gestures as
//! [`OverlayEvent`]s, pumps loader updates once per tick, and renders
//! whatever [`OverlaySession::displayed`] returns. All methods are
//! synchronous except [`OverlaySession::mount`]; background work goes
//! through the loader and comes back over the update channel.

pub mod keys;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use crossterm::event::KeyEvent;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::debug;

use crate::backend::{PortalBackend, Shell, UserDataStore, VolatileCache};
use crate::config::SearchConfig;
use crate::loader::{DynamicLoader, LoaderUpdate, QueryDisposition};
use crate::model::{COMMAND_SENTINEL, ItemKind, SearchCategory, SearchItem, SearchMode};
use crate::persist::UserData;
use crate::sanitize::sanitize_query;
use crate::search::{Catalog, RankContext, SIDEBAR_ACTION_ID, rank};

pub use keys::{KeyDecision, binding_legend};
pub use state::{CursorMove, EscapeAction, NavigationState, PAGE_STEP};

const SEARCH_PARAM: &str = "search";
const GOTO_PARAM: &str = "go";

/// Everything the embedding shell can feed the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Open,
    OpenCommand,
    Close,
    /// Escape key or back affordance: back out one level, or close.
    Escape,
    ToggleFuzzy,
    /// The raw text of the search input changed.
    QueryChanged(String),
    Move(CursorMove),
    /// Enter on the current cursor position.
    Activate,
    /// Mouse click on a specific item.
    ActivateItem(String),
    /// Mouse click on a category tile.
    EnterCategory(String),
    ToggleFavorite(String),
    OutsideClick,
}

/// The list the cursor currently navigates: category tiles on the default
/// view, ranked items everywhere else.
#[derive(Debug, Clone)]
pub enum DisplayList {
    Categories(Vec<SearchCategory>),
    Items(Vec<SearchItem>),
}

impl DisplayList {
    pub fn len(&self) -> usize {
        match self {
            DisplayList::Categories(cats) => cats.len(),
            DisplayList::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct OverlaySession {
    config: SearchConfig,
    nav: NavigationState,
    catalog: Catalog,
    user: UserData,
    loader: DynamicLoader,
    updates: UnboundedReceiver<LoaderUpdate>,
    shell: Arc<dyn Shell>,
    /// Homepage suggestion lists: upcoming assessments, active courses.
    upcoming: Vec<SearchItem>,
    active_courses: Vec<SearchItem>,
    /// Deep-link target waiting for its item to appear in the catalog.
    pending_goto: Option<String>,
    loading_dynamic: bool,
}

impl OverlaySession {
    pub fn new(
        backend: Arc<dyn PortalBackend>,
        store: Arc<dyn UserDataStore>,
        cache: Arc<dyn VolatileCache>,
        shell: Arc<dyn Shell>,
        config: SearchConfig,
        runtime: Handle,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let loader = DynamicLoader::new(backend, cache, config.clone(), runtime.clone(), tx);
        let user = UserData::new(store, runtime, &config);
        Self {
            config,
            nav: NavigationState::new(),
            catalog: Catalog::new(),
            user,
            loader,
            updates: rx,
            shell,
            upcoming: Vec::new(),
            active_courses: Vec::new(),
            pending_goto: None,
            loading_dynamic: false,
        }
    }

    /// Hydrate persisted lists, kick off the ambient loads and honor any
    /// deep-link URL parameters. Call once after construction.
    pub async fn mount(&mut self) {
        self.user.hydrate().await;
        self.loader.load_pages();
        self.loader.load_suggestions();

        if let Some(seed) = self.shell.read_url_param(SEARCH_PARAM) {
            self.nav.open();
            self.apply_query(seed);
        }
        if let Some(target) = self.shell.read_url_param(GOTO_PARAM) {
            self.pending_goto = Some(target);
            self.try_pending_goto();
        }
    }

    pub fn is_open(&self) -> bool {
        self.nav.is_open()
    }

    pub fn query(&self) -> &str {
        self.nav.query()
    }

    pub fn mode(&self) -> SearchMode {
        self.nav.mode()
    }

    pub fn selected(&self) -> usize {
        self.nav.selected()
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn user(&self) -> &UserData {
        &self.user
    }

    /// Whether a dynamic entity search is in flight for the current query.
    pub fn is_loading_dynamic(&self) -> bool {
        self.loading_dynamic
    }

    /// Route a raw key event. Returns true when the key was consumed and
    /// must not reach the host's focused widget.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match keys::decide(key, self.nav.is_open()) {
            KeyDecision::Handled(event) => {
                self.handle_event(event);
                true
            }
            KeyDecision::PassThrough => false,
        }
    }

    pub fn handle_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::Open => self.toggle_open(),
            OverlayEvent::OpenCommand => self.open_command(),
            OverlayEvent::Close | OverlayEvent::OutsideClick => self.close(),
            OverlayEvent::Escape => match self.nav.escape() {
                EscapeAction::Closed => self.after_close(),
                EscapeAction::WentBack => self.sync_after_query(),
            },
            OverlayEvent::ToggleFuzzy => {
                self.nav.toggle_fuzzy();
                self.clamp();
            }
            OverlayEvent::QueryChanged(raw) => self.apply_query(raw),
            OverlayEvent::Move(mv) => {
                let len = self.displayed().len();
                self.nav.move_cursor(mv, len);
            }
            OverlayEvent::Activate => self.activate_selected(),
            OverlayEvent::ActivateItem(id) => self.activate_item(&id),
            OverlayEvent::EnterCategory(id) => {
                self.nav.enter_category(id);
                self.sync_after_query();
            }
            OverlayEvent::ToggleFavorite(id) => {
                self.user.toggle_favorite(&id);
                self.clamp();
            }
        }
    }

    /// Drain loader updates. Call once per event-loop tick.
    pub fn pump(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.apply_update(update);
        }
    }

    /// Ranked items for the current query, mode and category.
    pub fn results(&self) -> Vec<SearchItem> {
        let (pool, in_category) = match self.nav.category() {
            Some(id) => {
                let items = match self.catalog.category(id) {
                    Some(cat) => cat.items,
                    None => {
                        debug!(category = %id, "unknown_category");
                        Vec::new()
                    }
                };
                (items, true)
            }
            None => (self.catalog.items().to_vec(), false),
        };
        let favorites = self.resolve_favorites();
        let ctx = RankContext {
            favorites: &favorites,
            recents: self.user.recents(),
            suggestions: [&self.upcoming, &self.active_courses],
            in_category,
        };
        rank(&pool, self.nav.command_body(), self.nav.mode(), &ctx, &self.config)
    }

    /// Category tiles for the default view.
    pub fn categories(&self) -> Vec<SearchCategory> {
        self.catalog.categories()
    }

    /// The list the cursor navigates right now. The default view (open,
    /// empty query, normal mode, top level) browses categories; every
    /// other state navigates ranked items.
    pub fn displayed(&self) -> DisplayList {
        let browsing = self.nav.is_open()
            && self.nav.query().trim().is_empty()
            && self.nav.category().is_none()
            && !self.nav.mode().is_override();
        if browsing {
            DisplayList::Categories(self.catalog.categories())
        } else {
            DisplayList::Items(self.results())
        }
    }

    fn toggle_open(&mut self) {
        if self.nav.is_open() {
            self.close();
            return;
        }
        self.nav.open();
        self.loader.load_suggestions();
        self.sync_after_query();
    }

    fn open_command(&mut self) {
        if !self.nav.is_open() {
            self.loader.load_suggestions();
        }
        self.nav.open_command();
        self.sync_after_query();
    }

    fn close(&mut self) {
        if !self.nav.is_open() {
            return;
        }
        self.nav.close();
        self.after_close();
    }

    /// Post-close bookkeeping, shared with the escape path.
    fn after_close(&mut self) {
        self.loader.invalidate();
        self.catalog.clear_dynamic();
        self.loading_dynamic = false;
        self.shell.write_url_param(SEARCH_PARAM, None, true);
        if self.pending_goto.is_none() {
            self.shell.write_url_param(GOTO_PARAM, None, true);
        }
    }

    fn apply_query(&mut self, raw: String) {
        // A leading command sentinel is control input, not content: keep it
        // while the rest of the text is sanitized.
        let clean = match raw.strip_prefix(COMMAND_SENTINEL) {
            Some(body) => {
                let mut seeded = String::from(COMMAND_SENTINEL);
                seeded.push_str(&sanitize_query(body, self.config.max_query_len));
                seeded
            }
            None => sanitize_query(&raw, self.config.max_query_len),
        };
        self.nav.set_query(clean);
        self.sync_after_query();
    }

    /// Re-establish every query-derived side effect: the URL mirror, the
    /// dynamic load schedule and the cursor clamp.
    fn sync_after_query(&mut self) {
        if self.nav.is_open() {
            let query = self.nav.query();
            let value = (!query.is_empty()).then_some(query);
            self.shell.write_url_param(SEARCH_PARAM, value, true);
        }

        // Command mode searches the static action set only, so entity
        // loads are suppressed along with short or closed states.
        let trimmed = if self.nav.is_open() && self.nav.mode() != SearchMode::Command {
            self.nav.command_body().trim().to_string()
        } else {
            String::new()
        };
        if self.loader.note_query(&trimmed) == QueryDisposition::Cleared {
            self.catalog.clear_dynamic();
            self.loading_dynamic = false;
        }
        self.clamp();
    }

    fn apply_update(&mut self, update: LoaderUpdate) {
        match update {
            LoaderUpdate::SearchStarted { generation } => {
                if generation == self.loader.current_generation() {
                    self.loading_dynamic = true;
                }
            }
            LoaderUpdate::SearchFinished {
                generation,
                query,
                items,
            } => {
                self.loading_dynamic = false;
                if generation != self.loader.current_generation() {
                    debug!(query = %query, "stale dynamic results dropped");
                    return;
                }
                self.catalog.set_dynamic(items);
                self.clamp();
                self.try_pending_goto();
            }
            LoaderUpdate::Pages { pages } => {
                self.catalog.set_pages(pages);
                self.clamp();
                self.try_pending_goto();
            }
            LoaderUpdate::Suggestions { upcoming, active } => {
                self.upcoming = upcoming;
                self.active_courses = active;
                self.clamp();
            }
        }
    }

    fn activate_selected(&mut self) {
        match self.displayed() {
            DisplayList::Categories(cats) => match cats.get(self.nav.selected()) {
                Some(cat) => {
                    let id = cat.id.clone();
                    self.nav.enter_category(id);
                    self.sync_after_query();
                }
                None => debug!(selected = self.nav.selected(), "activate_out_of_range"),
            },
            DisplayList::Items(items) => match items.get(self.nav.selected()).cloned() {
                Some(item) => self.select_item(&item),
                None => debug!(selected = self.nav.selected(), "activate_out_of_range"),
            },
        }
    }

    /// Mouse activation by id. Suggestion and recent rows rank into the
    /// results without being catalog-backed, so the ranked list resolves
    /// first and the catalog covers the rest.
    fn activate_item(&mut self, id: &str) {
        let item = self
            .results()
            .into_iter()
            .find(|item| item.id == id)
            .or_else(|| self.catalog.get(id).cloned());
        match item {
            Some(item) => self.select_item(&item),
            None => debug!(id = %id, "activate_unknown_item"),
        }
    }

    /// The full selection sequence: record usage and history, close, then
    /// dispatch to the shell.
    fn select_item(&mut self, item: &SearchItem) {
        let query = self.nav.query().to_string();
        self.catalog.note_usage(&item.id, Utc::now().timestamp_millis());
        self.user.record_selection(item, &query);
        self.close();

        match item.category {
            ItemKind::Action => {
                if item.id == SIDEBAR_ACTION_ID {
                    self.shell.toggle_sidebar();
                } else {
                    self.shell.dispatch_command(&item.id);
                }
            }
            _ => self.shell.navigate(&item.path),
        }
    }

    /// Fire a waiting deep-link selection once its item exists.
    fn try_pending_goto(&mut self) {
        let Some(target) = self.pending_goto.clone() else {
            return;
        };
        let Some(item) = self.catalog.get(&target).cloned() else {
            return;
        };
        self.pending_goto = None;
        self.shell.write_url_param(GOTO_PARAM, None, true);
        self.select_item(&item);
    }

    fn resolve_favorites(&self) -> Vec<SearchItem> {
        self.user
            .favorites()
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect()
    }

    fn clamp(&mut self) {
        let len = self.displayed().len();
        self.nav.clamp(len);
    }
}
