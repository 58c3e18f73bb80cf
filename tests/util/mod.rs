use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use omnibar::{
    AssessmentSummary, BackendError, CourseSummary, OverlaySession, PortalBackend, SearchConfig,
    SearchItem, Shell, TtlCache, UserDataStore,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;

/// Portal backend with canned datasets and failure toggles.
#[allow(dead_code)]
#[derive(Default)]
pub struct StubBackend {
    pub search_ok: bool,
    pub flags_fail: bool,
    pub fetch_fails: bool,
    pub assessments: Vec<AssessmentSummary>,
    pub courses: Vec<CourseSummary>,
    pub flags: HashMap<String, bool>,
    pub search_queries: Mutex<Vec<String>>,
}

#[async_trait]
impl PortalBackend for StubBackend {
    async fn search_assessments(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentSummary>, BackendError> {
        self.search_queries.lock().push(query.to_string());
        if !self.search_ok {
            return Err(BackendError::Unavailable("assessment search".into()));
        }
        let needle = query.to_lowercase();
        Ok(self
            .assessments
            .iter()
            .filter(|row| {
                row.title.to_lowercase().contains(&needle)
                    || row.code.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_courses(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CourseSummary>, BackendError> {
        if !self.search_ok {
            return Err(BackendError::Unavailable("course search".into()));
        }
        let needle = query.to_lowercase();
        Ok(self
            .courses
            .iter()
            .filter(|row| row.title.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_assessments(&self) -> Result<Vec<AssessmentSummary>, BackendError> {
        if self.fetch_fails {
            return Err(BackendError::Request("fetch assessments".into()));
        }
        Ok(self.assessments.clone())
    }

    async fn fetch_courses(&self) -> Result<Vec<CourseSummary>, BackendError> {
        if self.fetch_fails {
            return Err(BackendError::Request("fetch courses".into()));
        }
        Ok(self.courses.clone())
    }

    async fn feature_flags(&self) -> Result<HashMap<String, bool>, BackendError> {
        if self.flags_fail {
            return Err(BackendError::Unavailable("flags".into()));
        }
        Ok(self.flags.clone())
    }
}

/// In-memory user store that records every write.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemStore {
    pub favorites: Mutex<Vec<String>>,
    pub recents: Mutex<Vec<SearchItem>>,
    pub history: Mutex<Vec<String>>,
    pub usage: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl UserDataStore for MemStore {
    async fn favorites(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.favorites.lock().clone())
    }

    async fn add_favorite(&self, id: &str) -> Result<(), BackendError> {
        self.favorites.lock().push(id.to_string());
        Ok(())
    }

    async fn remove_favorite(&self, id: &str) -> Result<(), BackendError> {
        self.favorites.lock().retain(|fav| fav != id);
        Ok(())
    }

    async fn recent_items(&self, limit: usize) -> Result<Vec<SearchItem>, BackendError> {
        Ok(self.recents.lock().iter().take(limit).cloned().collect())
    }

    async fn history(&self, limit: usize) -> Result<Vec<String>, BackendError> {
        Ok(self.history.lock().iter().take(limit).cloned().collect())
    }

    async fn append_history(&self, query: &str) -> Result<(), BackendError> {
        self.history.lock().insert(0, query.to_string());
        Ok(())
    }

    async fn track_usage(&self, item_id: &str, kind: &str) -> Result<(), BackendError> {
        self.usage.lock().push((item_id.to_string(), kind.to_string()));
        Ok(())
    }
}

/// Shell that records navigations, dispatches and URL parameters.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingShell {
    pub navigations: Mutex<Vec<String>>,
    pub commands: Mutex<Vec<String>>,
    pub sidebar_toggles: Mutex<u32>,
    pub params: Mutex<HashMap<String, String>>,
}

impl Shell for RecordingShell {
    fn navigate(&self, path: &str) {
        self.navigations.lock().push(path.to_string());
    }

    fn dispatch_command(&self, id: &str) {
        self.commands.lock().push(id.to_string());
    }

    fn toggle_sidebar(&self) {
        *self.sidebar_toggles.lock() += 1;
    }

    fn read_url_param(&self, name: &str) -> Option<String> {
        self.params.lock().get(name).cloned()
    }

    fn write_url_param(&self, name: &str, value: Option<&str>, _replace: bool) {
        let mut params = self.params.lock();
        match value {
            Some(value) => {
                params.insert(name.to_string(), value.to_string());
            }
            None => {
                params.remove(name);
            }
        }
    }
}

#[allow(dead_code)]
pub fn assessment(id: i64, title: &str, due_in_hours: Option<i64>) -> AssessmentSummary {
    AssessmentSummary {
        id,
        metaclass_id: id * 10,
        title: title.to_string(),
        code: format!("CODE{id}"),
        subject: "Mathematics".to_string(),
        due: due_in_hours.map(|h| Utc::now() + ChronoDuration::hours(h)),
    }
}

#[allow(dead_code)]
pub fn course(programme: i64, title: &str) -> CourseSummary {
    CourseSummary {
        programme,
        metaclass: programme * 10,
        title: title.to_string(),
        code: format!("C{programme}"),
        description: Some("Year 12".to_string()),
    }
}

/// Config with a debounce short enough for tests to wait out.
#[allow(dead_code)]
pub fn fast_config() -> SearchConfig {
    SearchConfig {
        debounce: Duration::from_millis(20),
        ..SearchConfig::default()
    }
}

/// Wire a session from stubs. The handles stay shared so tests can assert
/// on recorded calls afterwards.
#[allow(dead_code)]
pub fn session_with(
    backend: Arc<StubBackend>,
    store: Arc<MemStore>,
    shell: Arc<RecordingShell>,
) -> OverlaySession {
    let config = fast_config();
    let cache = Arc::new(TtlCache::new(8, config.cache_ttl));
    OverlaySession::new(backend, store, cache, shell, config, Handle::current())
}

/// Give spawned background tasks time to run.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(60)).await;
}
