//! Cell rendering and click behavior through the table engine.

mod support;

use std::sync::atomic::Ordering;

use gridkit_lib::column::Cell;
use gridkit_lib::column::CellAction;
use gridkit_lib::column::CellContent;
use gridkit_lib::column::Editor;
use gridkit_lib::column::RowAction;
use gridkit_lib::model::RowId;
use serde_json::json;
use support::Fixture;
use support::MemoryBackend;

#[tokio::test]
async fn test_quick_toggle_saves_on_single_click() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();
    engine.refresh().await.unwrap();
    let id = RowId::from("1");

    let column = engine.column("active").unwrap();
    assert!(matches!(
        column.render_cell(&engine.row(&id).unwrap()),
        Cell::Read(CellContent::Icon { checked: false, .. })
    ));

    let action = engine.click(&id, "active").await.unwrap();
    assert_eq!(action, CellAction::Save(json!(true)));
    assert!(engine.editing().is_none());

    let calls = fixture.rows.patch_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["active"], json!(true));
    drop(calls);

    assert_eq!(engine.row(&id).unwrap().get_bool("active").unwrap(), Some(true));
    assert_eq!(engine.double_click(&id, "active").unwrap(), CellAction::None);
}

#[tokio::test]
async fn test_double_click_enters_edit_mode() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();
    engine.refresh().await.unwrap();
    let id = RowId::from("2");

    assert_eq!(engine.double_click(&id, "name").unwrap(), CellAction::BeginEdit);
    let row = engine.row(&id).unwrap();
    assert!(matches!(
        engine.column("name").unwrap().render_cell(&row),
        Cell::Edit(Editor::Text { .. })
    ));
    assert!(matches!(
        engine.column("depth").unwrap().render_cell(&row),
        Cell::Read(_)
    ));

    engine.cancel_edit();
    assert!(matches!(
        engine.column("name").unwrap().render_cell(&row),
        Cell::Read(_)
    ));
    assert_eq!(fixture.rows.patches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fk_label_from_template() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();
    engine.refresh().await.unwrap();
    let row = engine.row(&RowId::from("1")).unwrap();
    let machine = engine.column("machine").unwrap();

    // no options yet: the raw id
    assert_eq!(machine.render(&row).plain_text(), "7");

    engine.load_reference_data().await.unwrap();
    let machine = engine.column("machine").unwrap();
    assert_eq!(machine.render(&row).plain_text(), "A1-Press");

    let factory = engine.column("factory").unwrap();
    assert_eq!(factory.render(&row).plain_text(), "North");

    let Some(Editor::Choice { options, selected, .. }) = machine.editor(&row) else {
        panic!("expected a choice editor");
    };
    assert_eq!(selected.as_deref(), Some("7"));
    assert_eq!(options[1].label, "A2");
}

#[tokio::test]
async fn test_expanded_detail_matches_cells() {
    let fixture = Fixture::new(MemoryBackend::with_pits(3));
    let engine = fixture.engine();
    engine.load_reference_data().await.unwrap();
    engine.refresh().await.unwrap();
    let id = RowId::from("2");

    let action = engine.row_action(&id, RowAction::Expand { expanded: false }).unwrap();
    assert_eq!(action, CellAction::ToggleExpand(id.clone()));
    assert!(engine.is_expanded(&id));

    let row = engine.row(&id).unwrap();
    let detail = engine.expanded_detail(&id).unwrap();
    assert_eq!(detail.len(), engine.matrix().field_configs.len());
    for (config, (header, content)) in engine.matrix().field_configs.iter().zip(&detail) {
        assert_eq!(header, &config.header);
        assert_eq!(content, &engine.column(&config.key).unwrap().render(&row));
    }
}

#[tokio::test]
async fn test_selection_column_and_toggle_all() {
    let fixture = Fixture::new(MemoryBackend::with_pits(12));
    let engine = fixture.engine();
    engine.refresh().await.unwrap();
    let id = RowId::from("3");

    let ids: Vec<_> = engine.columns().iter().map(|c| c.id().to_string()).collect();
    assert_eq!(ids[..3], ["__select", "__actions", "factory"]);

    engine.click(&id, "__select").await.unwrap();
    let row = engine.row(&id).unwrap();
    assert_eq!(
        engine.column("__select").unwrap().render(&row),
        CellContent::Checkbox { checked: true }
    );

    engine.toggle_all();
    assert!(engine.is_all_selected());
    assert_eq!(engine.selected_ids().len(), 10);

    engine.set_page(1).await.unwrap();
    assert!(!engine.is_all_selected());
    engine.toggle_all();
    assert_eq!(engine.selected_ids().len(), 12);
}

#[tokio::test]
async fn test_create_and_delete() {
    let fixture = Fixture::new(MemoryBackend::with_pits(5));
    let engine = fixture.engine();
    engine.refresh().await.unwrap();

    let mut fields = serde_json::Map::new();
    fields.insert("name".into(), json!("New pit"));
    let created = engine.create_record(fields).await.unwrap();
    assert_eq!(engine.count(), 6);
    assert_eq!(engine.rows()[0], created);

    fixture.rows.fail_deletes.lock().unwrap().push(RowId::from("2"));
    engine.toggle_selection(&RowId::from("1"));
    engine.toggle_selection(&RowId::from("2"));

    let err = engine.delete_selected().await.unwrap_err();
    assert!(matches!(err, gridkit_lib::Error::Mutation(e) if e.record_id == Some(RowId::from("2"))));
    assert_eq!(engine.count(), 5);
    assert!(engine.row(&RowId::from("1")).is_none());
    assert_eq!(engine.selected_ids(), [RowId::from("2")]);
}
