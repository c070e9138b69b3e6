//! Cell edits, clicks, create and delete

use futures::future::join_all;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::TableEngine;
use crate::column::CellAction;
use crate::column::EditInput;
use crate::column::EditingCell;
use crate::column::RowAction;
use crate::error::Error;
use crate::error::MutationError;
use crate::error::MutationKind;
use crate::model::Row;
use crate::model::RowId;
use crate::optimistic::SaveOutcome;

impl TableEngine {
    // =========================================================================
    // Edit mode
    // =========================================================================

    /// Puts one cell in edit mode.
    ///
    /// Validation messages of other cells are dropped.
    pub fn begin_edit(&self, id: &RowId, key: &str) -> Result<(), Error> {
        let column = self.column(key)?;
        if !column.is_editable() {
            return Err(Error::InvalidOperation(format!("'{key}' is not editable inline")));
        }
        self.require_row(id)?;

        let cell = EditingCell::new(id.clone(), key);
        self.update_view(|view| {
            view.validation.retain(|(row, field), _| row == id && field == key);
            view.editing = Some(cell);
        });
        Ok(())
    }

    pub fn cancel_edit(&self) {
        self.update_view(|view| view.editing = None);
    }

    pub fn editing(&self) -> Option<EditingCell> {
        self.read_view(|view| view.editing.clone())
    }

    /// The inline message shown under a cell whose input was rejected.
    pub fn validation_message(&self, id: &RowId, key: &str) -> Option<String> {
        self.read_view(|view| view.validation.get(&(id.clone(), key.to_string())).cloned())
    }

    /// Validates editor input and saves it.
    ///
    /// Invalid input is kept as an inline message and blocks the save. A
    /// committed save closes the editor; a reverted one is reported to the
    /// error reporter by the cell's controller.
    pub async fn commit_edit(&self, id: &RowId, key: &str, input: EditInput) -> Result<SaveOutcome, Error> {
        let column = self.column(key)?;
        let row = self.require_row(id)?;
        let cell = (id.clone(), key.to_string());

        let value = match column.parse_input(&row, input) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("input for {id}.{key} rejected: {e}");
                self.update_view(|view| view.validation.insert(cell, e.message.clone()));
                return Err(e.into());
            }
        };

        let field = column
            .controller(&row)
            .ok_or_else(|| Error::InvalidOperation(format!("'{key}' is not editable inline")))?;
        let outcome = field.save(value).await;

        if !outcome.is_rejected() {
            self.update_view(|view| {
                if outcome.is_committed() {
                    view.validation.remove(&cell);
                }
                if view.editing.as_ref().is_some_and(|e| e.is(id, key)) {
                    view.editing = None;
                }
            });
        }
        Ok(outcome)
    }

    // =========================================================================
    // Clicks
    // =========================================================================

    /// Single click on a cell. Quick toggles save right away; the selection
    /// column toggles the row.
    pub async fn click(&self, id: &RowId, key: &str) -> Result<CellAction, Error> {
        let column = self.column(key)?;
        let row = self.require_row(id)?;

        let action = column.on_click(&row);
        match &action {
            CellAction::ToggleSelection(id) => {
                self.toggle_selection(id);
            }
            CellAction::Save(value) => {
                if let Some(field) = column.controller(&row) {
                    field.save(value.clone()).await;
                }
            }
            _ => {}
        }
        Ok(action)
    }

    /// Double click on a cell; enters edit mode where allowed.
    pub fn double_click(&self, id: &RowId, key: &str) -> Result<CellAction, Error> {
        let column = self.column(key)?;
        let row = self.require_row(id)?;

        let action = column.on_double_click(&row);
        if action == CellAction::BeginEdit {
            self.begin_edit(id, key)?;
        }
        Ok(action)
    }

    /// A button in the actions column. Expansion is handled here; every
    /// other action is returned for the caller to carry out.
    pub fn row_action(&self, id: &RowId, action: RowAction) -> Result<CellAction, Error> {
        let column = self.column(crate::compile::ACTIONS_COLUMN)?;
        let row = self.require_row(id)?;

        let action = column.on_action(&row, action);
        if let CellAction::ToggleExpand(id) = &action {
            self.toggle_expanded(id);
        }
        Ok(action)
    }

    // =========================================================================
    // Create and delete
    // =========================================================================

    /// Creates a record and prepends it to the page.
    pub async fn create_record(&self, fields: Map<String, Value>) -> Result<Row, Error> {
        match self.backends.rows.create(&self.config.endpoint, &fields).await {
            Ok(row) => {
                log::info!("created record {:?} in '{}'", row.id(), self.config.storage_key);
                self.rows.add_record(row.clone());
                self.fire_beacon(json!({
                    "event": "create",
                    "table": self.config.storage_key,
                }));
                Ok(row)
            }
            Err(e) => {
                let error = MutationError::from_error(None, MutationKind::Create, None, &e);
                log::error!("{error}");
                self.report(&error);
                Err(error.into())
            }
        }
    }

    /// Deletes records concurrently and drops the deleted ones locally.
    ///
    /// Every delete is attempted. Each failure goes to the error reporter;
    /// the first one is returned after the successful deletes are applied.
    pub async fn delete_records(&self, ids: &[RowId]) -> Result<usize, Error> {
        let backend = self.backends.rows.as_ref();
        let endpoint = self.config.endpoint.as_str();
        let results = join_all(ids.iter().map(|id| async move {
            (id, backend.delete(endpoint, id).await)
        }))
        .await;

        let mut deleted = Vec::with_capacity(ids.len());
        let mut first_error = None;
        for (id, result) in results {
            match result {
                Ok(()) => deleted.push(id.clone()),
                Err(e) => {
                    let error = MutationError::from_error(Some(id.clone()), MutationKind::Delete, None, &e);
                    log::error!("{error}");
                    self.report(&error);
                    first_error.get_or_insert(error);
                }
            }
        }

        self.rows.delete_records(&deleted);
        for id in &deleted {
            self.controllers.remove_record(id);
        }
        self.update_view(|view| {
            for id in &deleted {
                view.selection.deselect(id);
                view.expanded.remove(id);
            }
        });
        if !deleted.is_empty() {
            self.fire_beacon(json!({
                "event": "delete",
                "table": self.config.storage_key,
                "count": deleted.len(),
            }));
        }

        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(deleted.len()),
        }
    }

    /// Deletes every selected row.
    pub async fn delete_selected(&self) -> Result<usize, Error> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return Ok(0);
        }
        self.delete_records(&ids).await
    }
}
