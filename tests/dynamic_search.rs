mod util;

use std::sync::Arc;

use anyhow::Context;
use omnibar::OverlayEvent;
use util::{MemStore, RecordingShell, StubBackend, assessment, course, session_with, settle};

#[tokio::test]
async fn typed_query_loads_dynamic_entities_once() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![assessment(7, "Algebra Test", Some(30))],
        courses: vec![course(3, "Algebra Fundamentals")],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(Arc::clone(&backend), store, shell);
    session.mount().await;
    settle().await;
    session.pump();

    session.handle_event(OverlayEvent::Open);
    for partial in ["a", "al", "alg", "algebra"] {
        session.handle_event(OverlayEvent::QueryChanged(partial.into()));
    }
    settle().await;
    session.pump();

    let results = session.results();
    let ids: Vec<&str> = results.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["assessment-7-70", "course-3-30"]);
    assert_eq!(
        backend.search_queries.lock().clone(),
        vec!["algebra".to_string()],
        "rapid edits must coalesce into one backend search"
    );
    assert!(!session.is_loading_dynamic());
}

#[tokio::test]
async fn clearing_the_query_drops_dynamic_results_immediately() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![assessment(7, "Algebra Test", Some(30))],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;
    settle().await;
    session.pump();

    session.handle_event(OverlayEvent::Open);
    session.handle_event(OverlayEvent::QueryChanged("algebra".into()));
    settle().await;
    session.pump();
    assert_eq!(session.results().len(), 1);

    session.handle_event(OverlayEvent::QueryChanged(String::new()));

    // Retyping before the debounce fires sees no leftover entities.
    session.handle_event(OverlayEvent::QueryChanged("algebra".into()));
    assert!(
        session.results().is_empty(),
        "cleared dynamic items must not reappear before a fresh load"
    );
}

#[tokio::test]
async fn closing_mid_debounce_cancels_the_search() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![assessment(7, "Algebra Test", Some(30))],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(Arc::clone(&backend), store, shell);
    session.mount().await;

    session.handle_event(OverlayEvent::Open);
    session.handle_event(OverlayEvent::QueryChanged("algebra".into()));
    session.handle_event(OverlayEvent::Close);
    settle().await;
    session.pump();

    assert!(
        backend.search_queries.lock().is_empty(),
        "closing before the debounce fires must cancel the search"
    );
    assert!(!session.is_loading_dynamic());
}

#[tokio::test]
async fn short_queries_never_schedule_a_search() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(Arc::clone(&backend), store, shell);
    session.mount().await;

    session.handle_event(OverlayEvent::Open);
    session.handle_event(OverlayEvent::QueryChanged("a".into()));
    settle().await;
    session.pump();

    assert!(backend.search_queries.lock().is_empty());
    assert!(!session.is_loading_dynamic());
}

#[tokio::test]
async fn overdue_assessments_rank_above_upcoming() -> anyhow::Result<()> {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![
            assessment(1, "Maths Test", Some(5)),
            assessment(2, "Maths Quiz", Some(-5)),
        ],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;
    settle().await;
    session.pump();

    session.handle_event(OverlayEvent::Open);
    session.handle_event(OverlayEvent::QueryChanged("maths".into()));
    settle().await;
    session.pump();

    let results = session.results();
    let overdue = results.first().context("overdue quiz should rank first")?;
    assert_eq!(overdue.id, "assessment-2-20");
    assert_eq!(overdue.badge.as_deref(), Some("Overdue"));
    let upcoming = results.get(1).context("upcoming test should follow")?;
    assert_eq!(upcoming.id, "assessment-1-10");
    Ok(())
}

#[tokio::test]
async fn suggestions_fill_the_default_view() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![
            assessment(1, "Essay", Some(50)),
            assessment(2, "Quiz", Some(2)),
            assessment(3, "Old Draft", Some(-20)),
        ],
        courses: vec![course(9, "Physics")],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;
    settle().await;
    session.pump();

    session.handle_event(OverlayEvent::Open);
    let results = session.results();
    let ids: Vec<&str> = results.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["assessment-2-20", "assessment-1-10", "course-9-90"],
        "upcoming sorted by due date, past items excluded, courses after"
    );
    assert!(results[0].badge.as_deref().unwrap_or("").starts_with("Due "));
    assert_eq!(results[2].badge.as_deref(), Some("Course"));
}

#[tokio::test]
async fn clicking_a_suggestion_row_navigates() {
    let backend = Arc::new(StubBackend {
        search_ok: true,
        assessments: vec![assessment(1, "Essay", Some(6))],
        ..Default::default()
    });
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, Arc::clone(&shell));
    session.mount().await;
    settle().await;
    session.pump();

    session.handle_event(OverlayEvent::Open);
    assert!(session.results().iter().any(|item| item.id == "assessment-1-10"));

    // Mouse activation on a suggestion row behaves like Enter on it.
    session.handle_event(OverlayEvent::ActivateItem("assessment-1-10".into()));
    assert!(!session.is_open());
    assert_eq!(
        shell.navigations.lock().clone(),
        vec!["/assessments/1".to_string()]
    );
}
