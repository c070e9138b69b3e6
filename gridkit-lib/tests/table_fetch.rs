//! Page loading, filters and fetch ordering through the table engine.

mod support;

use std::time::Duration;

use gridkit_lib::TableEngine;
use gridkit_lib::config::EngineConfig;
use gridkit_lib::error::ApiError;
use gridkit_lib::error::Error;
use gridkit_lib::model::ColumnFilter;
use gridkit_lib::model::Sort;
use gridkit_lib::rows::FetchOutcome;
use support::Fixture;
use support::MemoryBackend;

#[tokio::test]
async fn test_page_load() {
    let fixture = Fixture::new(MemoryBackend::with_pits(37));
    let engine = fixture.engine();

    let outcome = engine.refresh().await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied { count: 37 });
    assert_eq!(engine.count(), 37);
    assert_eq!(engine.rows().len(), 10);
    assert_eq!(engine.page_count(), 4);

    engine.set_page(3).await.unwrap();
    assert_eq!(engine.rows().len(), 7);
    assert_eq!(engine.count(), 37);

    let last = fixture.rows.list_calls.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.get("page"), Some("4"));
    assert_eq!(last.get("page_size"), Some("10"));
}

#[tokio::test]
async fn test_filters_reach_the_backend() {
    let fixture = Fixture::new(MemoryBackend::with_pits(37));
    let engine = fixture.engine();
    engine.set_page(2).await.unwrap();

    engine
        .set_filter(ColumnFilter::boolean("active", &[true]))
        .await
        .unwrap();
    assert_eq!(engine.pagination().page_index, 0);
    assert_eq!(engine.count(), 18);

    engine.set_filter(ColumnFilter::text("name", "  ")).await.unwrap();
    engine.set_sort(Some(Sort::desc("depth"))).await.unwrap();

    let params = engine.query_params();
    assert_eq!(params.get("active_in"), Some("true"));
    assert_eq!(params.get("ordering"), Some("-depth"));
    assert!(!params.contains("name_icontains"));

    engine.clear_filters().await.unwrap();
    assert_eq!(engine.count(), 37);
}

#[tokio::test]
async fn test_unknown_filter_field_rejected() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();

    let err = engine
        .set_filter(ColumnFilter::text("nope", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, gridkit_lib::Error::UnknownField(key) if key == "nope"));
    assert!(fixture.rows.list_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_page_never_overwrites_newer() {
    let fixture = Fixture::new(MemoryBackend::with_pits(37));
    let engine = fixture.engine();
    let store = engine.row_store();

    let slow = store.begin_fetch();
    engine.set_global_filter("Pit 3").await.unwrap();
    let filtered = engine.count();

    let outcome = store
        .finish_fetch(slow, Ok(gridkit_lib::query::PageResponse::new(Vec::new(), 99)))
        .unwrap();
    assert_eq!(outcome, FetchOutcome::Stale);
    assert_eq!(engine.count(), filtered);
}

#[tokio::test(start_paused = true)]
async fn test_debounced_search_fetches_once() {
    let fixture = Fixture::new(MemoryBackend::with_pits(37));
    let engine = std::sync::Arc::new(fixture.engine());

    for term in ["P", "Pi", "Pit 1"] {
        engine.search_debounced(term);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    let calls = fixture.rows.list_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].get("search"), Some("Pit 1"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_page_times_out() {
    let fixture = Fixture::new(MemoryBackend::with_pits(12).slow_lists(Duration::from_secs(5)));
    let settings = EngineConfig::default().with_request_timeout(Duration::from_secs(1));
    let engine = TableEngine::new(support::pit_config(), settings, fixture.backends());

    let err = engine.refresh().await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Timeout(limit)) if limit == Duration::from_secs(1)));
    assert!(!engine.is_loading());
    assert!(engine.error().is_some());
    assert!(engine.rows().is_empty());
}
