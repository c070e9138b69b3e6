//! Display columns: row selection and row actions

use super::CellAction;
use super::CellContent;
use super::ColumnContext;
use super::RowAction;
use crate::model::ActionSet;
use crate::model::Row;

pub(super) fn render_selection(row: &Row, ctx: &ColumnContext) -> CellContent {
    let checked = row.id().is_some_and(|id| ctx.selected.contains(&id));
    CellContent::Checkbox { checked }
}

pub(super) fn click_selection(row: &Row) -> CellAction {
    row.id().map_or(CellAction::None, CellAction::ToggleSelection)
}

/// The enabled actions, in a fixed order.
pub(super) fn render_actions(actions: &ActionSet, row: &Row, ctx: &ColumnContext) -> CellContent {
    let mut buttons = Vec::new();
    if actions.expand {
        let expanded = row.id().is_some_and(|id| ctx.expanded.contains(&id));
        buttons.push(RowAction::Expand { expanded });
    }
    if actions.edit {
        buttons.push(RowAction::Edit);
    }
    if actions.share {
        buttons.push(RowAction::Share);
    }
    buttons.extend(actions.custom.iter().cloned().map(RowAction::Custom));
    if actions.delete {
        buttons.push(RowAction::Delete);
    }
    CellContent::Actions(buttons)
}

pub(super) fn invoke(actions: &ActionSet, row: &Row, action: RowAction) -> CellAction {
    let Some(id) = row.id() else {
        return CellAction::None;
    };
    let enabled = match &action {
        RowAction::Edit => actions.edit,
        RowAction::Delete => actions.delete,
        RowAction::Expand { .. } => actions.expand,
        RowAction::Share => actions.share,
        RowAction::Custom(name) => actions.custom.contains(name),
    };
    match action {
        _ if !enabled => CellAction::None,
        RowAction::Expand { .. } => CellAction::ToggleExpand(id),
        action => CellAction::Invoke { row: id, action },
    }
}
