//! Favorites, recents, and query history.
//!
//! Local state is authoritative for the open session: selections mutate the
//! in-memory lists at once, then spawn best-effort store writes. A failed
//! write logs a warning and nothing else; a failed hydrate starts empty.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

use crate::backend::UserDataStore;
use crate::config::SearchConfig;
use crate::model::SearchItem;

pub struct UserData {
    store: Arc<dyn UserDataStore>,
    runtime: Handle,
    favorites: Vec<String>,
    recents: Vec<SearchItem>,
    history: Vec<String>,
    recents_cap: usize,
    history_cap: usize,
}

impl UserData {
    pub fn new(store: Arc<dyn UserDataStore>, runtime: Handle, config: &SearchConfig) -> Self {
        Self {
            store,
            runtime,
            favorites: Vec::new(),
            recents: Vec::new(),
            history: Vec::new(),
            recents_cap: config.recents_cap,
            history_cap: config.history_cap,
        }
    }

    /// Pull persisted state. Each list degrades to empty on failure.
    pub async fn hydrate(&mut self) {
        match self.store.favorites().await {
            Ok(ids) => self.favorites = ids,
            Err(err) => warn!(error = %err, "favorites_load_failed"),
        }
        match self.store.recent_items(self.recents_cap).await {
            Ok(mut items) => {
                items.truncate(self.recents_cap);
                self.recents = items;
            }
            Err(err) => warn!(error = %err, "recents_load_failed"),
        }
        match self.store.history(self.history_cap).await {
            Ok(mut queries) => {
                queries.truncate(self.history_cap);
                self.history = queries;
            }
            Err(err) => warn!(error = %err, "history_load_failed"),
        }
    }

    /// Favorite ids in insertion order.
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|fav| fav == id)
    }

    /// Newest-first recent selections.
    pub fn recents(&self) -> &[SearchItem] {
        &self.recents
    }

    /// Newest-first past queries.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Flip favorite membership locally and persist in the background.
    /// Returns the new membership.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let store = Arc::clone(&self.store);
        let owned = id.to_string();
        if let Some(pos) = self.favorites.iter().position(|fav| fav == id) {
            self.favorites.remove(pos);
            self.runtime.spawn(async move {
                if let Err(err) = store.remove_favorite(&owned).await {
                    warn!(id = %owned, error = %err, "favorite_remove_failed");
                }
            });
            false
        } else {
            self.favorites.push(id.to_string());
            self.runtime.spawn(async move {
                if let Err(err) = store.add_favorite(&owned).await {
                    warn!(id = %owned, error = %err, "favorite_add_failed");
                }
            });
            true
        }
    }

    /// Record a selection: recents move-to-front with id dedup, history
    /// move-to-front with exact dedup (empty queries are never recorded),
    /// then a background usage/history write.
    pub fn record_selection(&mut self, item: &SearchItem, effective_query: &str) {
        self.recents.retain(|recent| recent.id != item.id);
        self.recents.insert(0, item.clone());
        self.recents.truncate(self.recents_cap);

        let query = effective_query.trim();
        let record_query = !query.is_empty();
        if record_query {
            self.history.retain(|past| past != query);
            self.history.insert(0, query.to_string());
            self.history.truncate(self.history_cap);
        }

        let store = Arc::clone(&self.store);
        let item_id = item.id.clone();
        let kind = item.category.as_str();
        let query = query.to_string();
        self.runtime.spawn(async move {
            if let Err(err) = store.track_usage(&item_id, kind).await {
                warn!(id = %item_id, error = %err, "usage_track_failed");
            }
            if record_query {
                if let Err(err) = store.append_history(&query).await {
                    warn!(error = %err, "history_append_failed");
                }
            }
        });
    }
}
