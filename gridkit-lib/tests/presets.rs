//! Preset scoping and application through the table engine.

mod support;

use std::sync::Arc;

use gridkit_lib::TableEngine;
use gridkit_lib::config::EngineConfig;
use gridkit_lib::model::ColumnFilter;
use gridkit_lib::model::TableConfig;
use gridkit_lib::presets::PresetKind;
use gridkit_lib::presets::SavedPreset;
use gridkit_lib::presets::SqlitePresetBackend;
use serde_json::json;
use support::Fixture;
use support::MemoryBackend;

#[tokio::test]
async fn test_presets_scoped_by_storage_key() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let pits = fixture.engine();
    pits.set_filter(ColumnFilter::text("name", "kiln")).await.unwrap();
    pits.save_preset(PresetKind::Filters, "kilns").await.unwrap();
    assert_eq!(pits.presets(PresetKind::Filters).presets().len(), 1);

    let generators = TableEngine::new(
        TableConfig {
            storage_key: "generator-table".into(),
            ..support::pit_config()
        },
        EngineConfig::default(),
        fixture.backends(),
    );
    generators.load_presets().await.unwrap();
    assert!(generators.presets(PresetKind::Filters).presets().is_empty());
}

#[tokio::test]
async fn test_legacy_presets_match_by_name() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let mut legacy = SavedPreset::new("Pits table: open", json!({}), "");
    legacy.storage_key = None;
    fixture.presets.seed(PresetKind::Filters, legacy);

    let engine = fixture.engine();
    engine.load_presets().await.unwrap();

    let names: Vec<_> = engine
        .presets(PresetKind::Filters)
        .presets()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Pits table: open"]);
}

#[tokio::test]
async fn test_apply_filter_preset() {
    let fixture = Fixture::new(MemoryBackend::with_pits(37));
    let engine = fixture.engine();
    engine
        .set_filter(ColumnFilter::boolean("active", &[true]))
        .await
        .unwrap();
    engine.set_global_filter("Pit").await.unwrap();
    engine.save_preset(PresetKind::Filters, "active").await.unwrap();

    engine.clear_filters().await.unwrap();
    assert_eq!(engine.count(), 37);

    engine.apply_preset(PresetKind::Filters, "active").await.unwrap();
    assert_eq!(engine.count(), 18);
    assert_eq!(engine.global_filter(), "Pit");

    engine.delete_preset(PresetKind::Filters, "active").await.unwrap();
    assert!(engine.presets(PresetKind::Filters).get("active").is_none());
    assert!(engine.apply_preset(PresetKind::Filters, "active").await.is_err());
}

#[tokio::test]
async fn test_column_preset_in_sqlite() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let sqlite = Arc::new(SqlitePresetBackend::open_in_memory().await.unwrap());
    let engine = TableEngine::new(
        support::pit_config(),
        EngineConfig::default(),
        fixture.backends().with_presets(sqlite),
    );

    assert!(engine.set_column_visible("depth", false));
    assert!(engine.move_column("labels", 0));
    engine.save_preset(PresetKind::Columns, "compact").await.unwrap();

    engine.reset_columns();
    assert!(engine.column_state().is_visible("depth"));

    engine.apply_preset(PresetKind::Columns, "compact").await.unwrap();
    let state = engine.column_state();
    assert!(!state.is_visible("depth"));
    assert_eq!(state.data_order()[0], "labels");
}

#[tokio::test]
async fn test_restore_touches_only_its_kind() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();
    engine.set_column_visible("depth", false);
    engine.set_filter(ColumnFilter::text("name", "Pit")).await.unwrap();

    let mut other = engine.snapshot();
    other.filters = [ColumnFilter::text("ghost", "x")].into_iter().collect();
    other.global_filter = "deep".into();
    other.column_visibility.insert("depth".into(), true);
    other.page_size = Some(25);

    engine.restore(PresetKind::Filters, other.clone());
    assert!(engine.filters().is_empty());
    assert_eq!(engine.global_filter(), "deep");
    assert_eq!(engine.snapshot().column_visibility.get("depth"), Some(&false));
    assert_eq!(engine.pagination().page_size, 10);

    engine.restore(PresetKind::Columns, other);
    assert_eq!(engine.snapshot().column_visibility.get("depth"), Some(&true));
    assert_eq!(engine.pagination().page_size, 25);
    assert_eq!(engine.global_filter(), "deep");
}
