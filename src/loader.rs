//! Debounced dynamic entity loading.
//!
//! Qualifying query edits schedule a debounce fire; each schedule bumps a
//! shared generation counter and the fire re-checks it after the sleep and
//! after the round trip, so superseded work dies silently. Per entity the
//! data comes from a three-stage chain: backend keyword search, then the
//! TTL-cached full dataset filtered locally, then a fresh full fetch. The
//! first stage to produce a non-empty result wins; empty results fall
//! through like failures. Total failure yields an empty list, never an
//! error.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::backend::{AssessmentSummary, BackendError, CourseSummary, PortalBackend, VolatileCache};
use crate::config::SearchConfig;
use crate::model::{BADGE_COURSE, BADGE_OVERDUE, ItemKind, SearchItem};
use crate::search::pages_from_flags;

const ASSESSMENTS_CACHE_KEY: &str = "assessments:all";
const COURSES_CACHE_KEY: &str = "courses:all";

/// Ranking weight for assessments past their due date.
const OVERDUE_PRIORITY: f32 = 15.0;
/// Ranking weight for other assessments.
const ASSESSMENT_PRIORITY: f32 = 8.0;
const COURSE_PRIORITY: f32 = 6.0;

/// Messages the loader posts back to the session.
#[derive(Debug)]
pub enum LoaderUpdate {
    /// A debounce fire began for `generation`.
    SearchStarted { generation: u64 },
    /// Entity results for the trimmed `query`.
    SearchFinished {
        generation: u64,
        query: String,
        items: Vec<SearchItem>,
    },
    /// Flag-filtered page layer; `None` when the flag fetch failed.
    Pages { pages: Option<Vec<SearchItem>> },
    /// Homepage suggestion lists: upcoming assessments, active courses.
    Suggestions {
        upcoming: Vec<SearchItem>,
        active: Vec<SearchItem>,
    },
}

/// What a query edit did to the load pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDisposition {
    /// A new debounced load was scheduled.
    Scheduled,
    /// Same trimmed query as the last schedule: nothing to do.
    Unchanged,
    /// The query no longer qualifies; dynamic results must drop.
    Cleared,
}

pub struct DynamicLoader {
    backend: Arc<dyn PortalBackend>,
    cache: Arc<dyn VolatileCache>,
    config: SearchConfig,
    runtime: Handle,
    updates: UnboundedSender<LoaderUpdate>,
    generation: Arc<AtomicU64>,
    suggestions_generation: Arc<AtomicU64>,
    last_scheduled: Option<String>,
}

impl DynamicLoader {
    pub fn new(
        backend: Arc<dyn PortalBackend>,
        cache: Arc<dyn VolatileCache>,
        config: SearchConfig,
        runtime: Handle,
        updates: UnboundedSender<LoaderUpdate>,
    ) -> Self {
        Self {
            backend,
            cache,
            config,
            runtime,
            updates,
            generation: Arc::new(AtomicU64::new(0)),
            suggestions_generation: Arc::new(AtomicU64::new(0)),
            last_scheduled: None,
        }
    }

    /// Generation of the most recent schedule or invalidation. Updates
    /// carrying an older generation are stale.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// React to a trimmed query. Whitespace-only edits arrive as the same
    /// trimmed text and fall out as `Unchanged`.
    pub fn note_query(&mut self, trimmed: &str) -> QueryDisposition {
        if trimmed.chars().count() < self.config.min_dynamic_query {
            self.invalidate();
            return QueryDisposition::Cleared;
        }
        if self.last_scheduled.as_deref() == Some(trimmed) {
            return QueryDisposition::Unchanged;
        }
        self.schedule(trimmed);
        QueryDisposition::Scheduled
    }

    /// Abandon any pending or in-flight fire.
    pub fn invalidate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.last_scheduled = None;
    }

    fn schedule(&mut self, trimmed: &str) {
        self.last_scheduled = Some(trimmed.to_string());
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.cache);
        let updates = self.updates.clone();
        let config = self.config.clone();
        let query = trimmed.to_string();

        self.runtime.spawn(async move {
            tokio::time::sleep(config.debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(query = %query, generation, "debounce_superseded");
                return;
            }
            let _ = updates.send(LoaderUpdate::SearchStarted { generation });
            info!(query = %query, generation, "dynamic_search_start");

            let (assessments, courses) = tokio::join!(
                load_assessments(backend.as_ref(), cache.as_ref(), &config, &query),
                load_courses(backend.as_ref(), cache.as_ref(), &config, &query),
            );

            if current.load(Ordering::SeqCst) != generation {
                debug!(query = %query, generation, "stale_response_discarded");
                return;
            }
            let mut items = assessments;
            items.extend(courses);
            debug!(query = %query, count = items.len(), "dynamic_search_done");
            let _ = updates.send(LoaderUpdate::SearchFinished {
                generation,
                query,
                items,
            });
        });
    }

    /// Fetch feature flags and derive the page layer. Runs once per mount.
    pub fn load_pages(&self) {
        let backend = Arc::clone(&self.backend);
        let updates = self.updates.clone();
        self.runtime.spawn(async move {
            let pages = match backend.feature_flags().await {
                Ok(flags) => Some(pages_from_flags(&flags)),
                Err(err) => {
                    warn!(error = %err, "feature_flags_failed");
                    None
                }
            };
            let _ = updates.send(LoaderUpdate::Pages { pages });
        });
    }

    /// Refresh the homepage suggestion lists through the cached datasets.
    /// Runs on each overlay open; the TTL cache absorbs the repeats. A
    /// separate generation keeps overlapping refreshes from landing out of
    /// order.
    pub fn load_suggestions(&self) {
        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.cache);
        let updates = self.updates.clone();
        let limit = self.config.dynamic_limit;
        let generation = self.suggestions_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.suggestions_generation);
        self.runtime.spawn(async move {
            let assessments = cached_assessments(backend.as_ref(), cache.as_ref()).await;
            let courses = cached_courses(backend.as_ref(), cache.as_ref()).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(generation, "stale_suggestions_discarded");
                return;
            }

            let now = Utc::now();
            let mut pending: Vec<&AssessmentSummary> = assessments
                .iter()
                .filter(|row| row.due.map(|due| due >= now).unwrap_or(false))
                .collect();
            pending.sort_by_key(|row| row.due);
            let upcoming: Vec<SearchItem> =
                pending.into_iter().take(limit).map(assessment_item).collect();
            let active: Vec<SearchItem> = courses.iter().take(limit).map(course_item).collect();

            let _ = updates.send(LoaderUpdate::Suggestions { upcoming, active });
        });
    }
}

async fn load_assessments(
    backend: &dyn PortalBackend,
    cache: &dyn VolatileCache,
    config: &SearchConfig,
    query: &str,
) -> Vec<SearchItem> {
    // Empty stages fall through like failures; only the last stage's
    // result stands as-is.
    match backend.search_assessments(query, config.dynamic_limit).await {
        Ok(rows) if !rows.is_empty() => return rows.iter().map(assessment_item).collect(),
        Ok(_) => debug!(query = %query, "assessment_search_empty"),
        Err(err) => warn!(error = %err, "assessment_search_failed"),
    }
    if let Some(rows) = cached_rows::<AssessmentSummary>(cache, ASSESSMENTS_CACHE_KEY) {
        let hits = filter_assessments(&rows, query, config.dynamic_limit);
        if !hits.is_empty() {
            return hits;
        }
    }
    let rows = fresh_rows(cache, ASSESSMENTS_CACHE_KEY, backend.fetch_assessments()).await;
    filter_assessments(&rows, query, config.dynamic_limit)
}

async fn load_courses(
    backend: &dyn PortalBackend,
    cache: &dyn VolatileCache,
    config: &SearchConfig,
    query: &str,
) -> Vec<SearchItem> {
    match backend.search_courses(query, config.dynamic_limit).await {
        Ok(rows) if !rows.is_empty() => return rows.iter().map(course_item).collect(),
        Ok(_) => debug!(query = %query, "course_search_empty"),
        Err(err) => warn!(error = %err, "course_search_failed"),
    }
    if let Some(rows) = cached_rows::<CourseSummary>(cache, COURSES_CACHE_KEY) {
        let hits = filter_courses(&rows, query, config.dynamic_limit);
        if !hits.is_empty() {
            return hits;
        }
    }
    let rows = fresh_rows(cache, COURSES_CACHE_KEY, backend.fetch_courses()).await;
    filter_courses(&rows, query, config.dynamic_limit)
}

fn filter_assessments(rows: &[AssessmentSummary], query: &str, limit: usize) -> Vec<SearchItem> {
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.title.to_lowercase().contains(&needle)
                || row.code.to_lowercase().contains(&needle)
                || row.subject.to_lowercase().contains(&needle)
        })
        .take(limit)
        .map(assessment_item)
        .collect()
}

fn filter_courses(rows: &[CourseSummary], query: &str, limit: usize) -> Vec<SearchItem> {
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.title.to_lowercase().contains(&needle)
                || row.code.to_lowercase().contains(&needle)
                || row
                    .description
                    .as_deref()
                    .map(|desc| desc.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .take(limit)
        .map(course_item)
        .collect()
}

/// Cache read half of the dataset layer: `None` on miss or a malformed
/// entry.
fn cached_rows<T: serde::de::DeserializeOwned>(
    cache: &dyn VolatileCache,
    key: &str,
) -> Option<Vec<T>> {
    let value = cache.get(key)?;
    match serde_json::from_value(value) {
        Ok(rows) => Some(rows),
        Err(err) => {
            debug!(key = %key, error = %err, "dataset_cache_malformed");
            None
        }
    }
}

/// Fetch a full dataset and re-cache it. Failure means an empty dataset,
/// not an error.
async fn fresh_rows<T: serde::Serialize>(
    cache: &dyn VolatileCache,
    key: &str,
    fetch: impl Future<Output = Result<Vec<T>, BackendError>>,
) -> Vec<T> {
    match fetch.await {
        Ok(rows) => {
            if let Ok(value) = serde_json::to_value(&rows) {
                cache.put(key, value);
            }
            rows
        }
        Err(err) => {
            warn!(key = %key, error = %err, "dataset_fetch_failed");
            Vec::new()
        }
    }
}

async fn cached_assessments(
    backend: &dyn PortalBackend,
    cache: &dyn VolatileCache,
) -> Vec<AssessmentSummary> {
    match cached_rows(cache, ASSESSMENTS_CACHE_KEY) {
        Some(rows) => rows,
        None => fresh_rows(cache, ASSESSMENTS_CACHE_KEY, backend.fetch_assessments()).await,
    }
}

async fn cached_courses(backend: &dyn PortalBackend, cache: &dyn VolatileCache) -> Vec<CourseSummary> {
    match cached_rows(cache, COURSES_CACHE_KEY) {
        Some(rows) => rows,
        None => fresh_rows(cache, COURSES_CACHE_KEY, backend.fetch_courses()).await,
    }
}

fn assessment_item(row: &AssessmentSummary) -> SearchItem {
    let id = format!("assessment-{}-{}", row.id, row.metaclass_id);
    let path = format!("/assessments/{}", row.id);
    let (priority, badge) = match row.due {
        Some(due) if due < Utc::now() => (OVERDUE_PRIORITY, Some(BADGE_OVERDUE.to_string())),
        Some(due) => (ASSESSMENT_PRIORITY, Some(format!("Due {}", due.format("%-d %b")))),
        None => (ASSESSMENT_PRIORITY, None),
    };
    let mut item = SearchItem::new(id, &row.title, ItemKind::Assessment, path)
        .with_description(format!("{} · {}", row.code, row.subject))
        .with_icon("clipboard")
        .with_keywords([row.code.clone(), row.subject.clone()])
        .with_priority(priority);
    if let Some(badge) = badge {
        item = item.with_badge(badge);
    }
    item
}

fn course_item(row: &CourseSummary) -> SearchItem {
    let id = format!("course-{}-{}", row.programme, row.metaclass);
    let path = format!("/courses/{}", row.programme);
    let description = match &row.description {
        Some(desc) => format!("{} · {}", row.code, desc),
        None => row.code.clone(),
    };
    SearchItem::new(id, &row.title, ItemKind::Course, path)
        .with_description(description)
        .with_icon("book-open")
        .with_keywords([row.code.clone(), row.title.clone()])
        .with_priority(COURSE_PRIORITY)
        .with_badge(BADGE_COURSE)
}
