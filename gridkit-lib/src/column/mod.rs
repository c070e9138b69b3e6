//! Column and cell factory
//!
//! [`build`] turns a [`ColumnSpec`] into a [`ColumnDefinition`]: a header,
//! a read-mode renderer, an optional editor and click behavior. The match
//! over field types is exhaustive, so adding a [`FieldKind`] fails to
//! compile until every column path handles it.
//!
//! Definitions are cheap and rebuilt on every render. The state that must
//! survive a rebuild (in-flight saves) lives in the
//! [`FieldRegistry`](crate::optimistic::FieldRegistry) of the context.
//!
//! # Example
//!
//! ```ignore
//! let ctx = ColumnContext::new(backend, "/api/pits").with_highlight("kiln");
//! let column = column::build(ColumnSpec::Field(config), &ctx);
//!
//! match column.render_cell(&row) {
//!     Cell::Read(content) => println!("{}", content.plain_text()),
//!     Cell::Edit(editor) => println!("{editor:?}"),
//! }
//! ```

mod boolean;
mod cell;
mod context;
mod display;
mod fk;
mod json;
mod number;
mod select;
mod state;
mod tag;
mod temporal;
mod text;

pub use cell::*;
pub use context::*;
pub use fk::apply_template;
pub use fk::clean_separators;
pub use fk::raw_id;
pub use fk::resolve_label;
pub use number::format_number;
pub use state::*;
pub use tag::tags_of;
pub use temporal::format_date;
pub use temporal::normalize_time;
pub use temporal::parse_date_input;
pub use temporal::parse_iso_date;

use std::sync::Arc;

use serde_json::Value;

use crate::compile::ACTIONS_COLUMN;
use crate::compile::BooleanInteraction;
use crate::compile::FieldConfig;
use crate::compile::FieldKind;
use crate::compile::SELECTION_COLUMN;
use crate::error::ValidationError;
use crate::model::ActionSet;
use crate::model::Row;
use crate::model::Surface;
use crate::optimistic::OptimisticField;
use crate::optimistic::PayloadShape;

/// What a column is built from.
#[derive(Debug, Clone)]
pub enum ColumnSpec {
    Field(FieldConfig),
    /// The row-selection checkbox column.
    Selection,
    /// The row-actions column.
    Actions(ActionSet),
}

/// Builds the column for `spec`.
pub fn build(spec: ColumnSpec, ctx: &ColumnContext) -> ColumnDefinition {
    ColumnDefinition {
        spec,
        ctx: ctx.clone(),
    }
}

/// Builds every column of a table in display order.
pub fn build_all(
    fields: &[FieldConfig],
    selection: bool,
    actions: &ActionSet,
    ctx: &ColumnContext,
) -> Vec<ColumnDefinition> {
    let mut columns = Vec::with_capacity(fields.len() + 2);
    if selection {
        columns.push(build(ColumnSpec::Selection, ctx));
    }
    if actions.any() {
        columns.push(build(ColumnSpec::Actions(actions.clone()), ctx));
    }
    columns.extend(
        fields
            .iter()
            .map(|config| build(ColumnSpec::Field(config.clone()), ctx)),
    );
    columns
}

/// One built column.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    spec: ColumnSpec,
    ctx: ColumnContext,
}

impl ColumnDefinition {
    pub fn id(&self) -> &str {
        match &self.spec {
            ColumnSpec::Field(config) => &config.key,
            ColumnSpec::Selection => SELECTION_COLUMN,
            ColumnSpec::Actions(_) => ACTIONS_COLUMN,
        }
    }

    pub fn header(&self) -> &str {
        match &self.spec {
            ColumnSpec::Field(config) => &config.header,
            ColumnSpec::Selection => "",
            ColumnSpec::Actions(_) => "Actions",
        }
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    pub fn field_config(&self) -> Option<&FieldConfig> {
        match &self.spec {
            ColumnSpec::Field(config) => Some(config),
            _ => None,
        }
    }

    /// Returns `true` if the cell can be edited inline.
    pub fn is_editable(&self) -> bool {
        self.field_config().is_some_and(|config| {
            config.editable_on(Surface::Inline) && !matches!(config.kind, FieldKind::Json(_))
        })
    }

    fn is_quick_toggle(&self) -> bool {
        matches!(
            self.field_config().map(|config| &config.kind),
            Some(FieldKind::Boolean(field)) if field.interaction == BooleanInteraction::QuickToggle
        )
    }

    /// The row as the cell should show it: an in-flight save wins over the
    /// row until the save settles.
    fn effective_row<'a>(&self, row: &'a Row) -> std::borrow::Cow<'a, Row> {
        let pending = self.field_config().and_then(|config| {
            let id = row.id()?;
            let field = self.ctx.controllers.get(&id, &config.key)?;
            field.is_saving().then(|| (config.key.clone(), field.current()))
        });
        match pending {
            Some((key, value)) => {
                let mut overlaid = row.clone();
                overlaid.insert(key, value);
                std::borrow::Cow::Owned(overlaid)
            }
            None => std::borrow::Cow::Borrowed(row),
        }
    }

    /// Read-mode content of the cell.
    pub fn render(&self, row: &Row) -> CellContent {
        let ctx = &self.ctx;
        let config = match &self.spec {
            ColumnSpec::Field(config) => config,
            ColumnSpec::Selection => return display::render_selection(row, ctx),
            ColumnSpec::Actions(actions) => return display::render_actions(actions, row, ctx),
        };
        let row = self.effective_row(row);
        let row = row.as_ref();
        let key = config.key.as_str();

        match &config.kind {
            FieldKind::Text(_) => text::render(key, row, ctx),
            FieldKind::Number(field) | FieldKind::Temperature(field) => number::render(field, key, row),
            FieldKind::Date => temporal::render_date(key, row, ctx.date_display),
            FieldKind::Time => temporal::render_time(key, row),
            FieldKind::Boolean(field) => boolean::render(field, key, row),
            FieldKind::Select(field) => select::render(field, key, row, ctx),
            FieldKind::ForeignKey(field) => fk::render(field, key, row, ctx),
            FieldKind::Tag(_) => tag::render(key, row),
            FieldKind::Json(field) => json::render(field, key, row),
        }
    }

    /// The editor for the cell, `None` for read-only columns.
    pub fn editor(&self, row: &Row) -> Option<Editor> {
        let config = self.field_config()?;
        let ctx = &self.ctx;
        let key = config.key.as_str();

        let editor = match &config.kind {
            FieldKind::Text(field) => text::editor(field, key, row),
            FieldKind::Number(field) | FieldKind::Temperature(field) => number::editor(field, key, row),
            FieldKind::Date => temporal::date_editor(key, row, ctx.date_display),
            FieldKind::Time => temporal::time_editor(key, row),
            FieldKind::Boolean(field) => boolean::editor(field, key, row),
            FieldKind::Select(field) => select::editor(field, key, row),
            FieldKind::ForeignKey(field) => fk::editor(field, key, row, ctx),
            FieldKind::Tag(field) => tag::editor(field, key, row, ctx),
            FieldKind::Json(_) => return None,
        };
        Some(editor)
    }

    /// Edit mode for the cell being edited, read mode otherwise.
    ///
    /// Quick-toggle booleans never enter edit mode.
    pub fn render_cell(&self, row: &Row) -> Cell {
        let editing = self.is_editable()
            && !self.is_quick_toggle()
            && row.id().is_some_and(|id| self.ctx.is_editing(&id, self.id()));
        if editing && let Some(editor) = self.editor(row) {
            return Cell::Edit(editor);
        }
        Cell::Read(self.render(row))
    }

    /// Converts editor input into the value to save.
    pub fn parse_input(&self, row: &Row, input: EditInput) -> Result<Value, ValidationError> {
        let Some(config) = self.field_config() else {
            return Err(ValidationError::read_only(self.id()));
        };
        let key = config.key.as_str();

        match &config.kind {
            FieldKind::Text(_) => text::parse(key, input),
            FieldKind::Number(field) | FieldKind::Temperature(field) => number::parse(field, key, input),
            FieldKind::Date => temporal::parse_date(key, input),
            FieldKind::Time => temporal::parse_time(key, input),
            FieldKind::Boolean(field) => boolean::parse(field, key, input),
            FieldKind::Select(field) => select::parse(field, key, row, input),
            FieldKind::ForeignKey(field) => fk::parse(field, key, input, &self.ctx),
            FieldKind::Tag(_) => tag::parse(input),
            FieldKind::Json(_) => Err(ValidationError::read_only(key)),
        }
    }

    /// How a save of this column is put on the wire.
    pub fn payload_shape(&self) -> Option<PayloadShape> {
        self.field_config().map(PayloadShape::for_field)
    }

    pub fn on_click(&self, row: &Row) -> CellAction {
        match &self.spec {
            ColumnSpec::Selection => display::click_selection(row),
            ColumnSpec::Field(config) if self.is_quick_toggle() && self.is_editable() => {
                CellAction::Save(boolean::toggled(&config.key, row))
            }
            _ => CellAction::None,
        }
    }

    pub fn on_double_click(&self, _row: &Row) -> CellAction {
        if self.is_editable() && !self.is_quick_toggle() {
            CellAction::BeginEdit
        } else {
            CellAction::None
        }
    }

    pub fn on_action(&self, row: &Row, action: RowAction) -> CellAction {
        match &self.spec {
            ColumnSpec::Actions(actions) => display::invoke(actions, row, action),
            _ => CellAction::None,
        }
    }

    /// The edit controller of this cell, shared across rebuilds.
    ///
    /// An idle controller takes the row's current value, so a refetch that
    /// changed the value is picked up.
    pub fn controller(&self, row: &Row) -> Option<Arc<OptimisticField>> {
        let config = self.field_config()?;
        if !self.is_editable() {
            return None;
        }
        let id = row.id()?;
        let value = row.value(&config.key);
        let ctx = &self.ctx;

        let field = ctx.controllers.get_or_create(&id, &config.key, || {
            OptimisticField::new(
                id.clone(),
                ctx.endpoint.clone(),
                PayloadShape::for_field(config),
                value.clone(),
                ctx.backend.clone(),
                ctx.callbacks.clone(),
            )
        });
        field.observe(value);
        Some(field)
    }

    /// Validates `input` and saves it through the cell's controller.
    pub async fn save(
        &self,
        row: &Row,
        input: EditInput,
    ) -> Result<crate::optimistic::SaveOutcome, ValidationError> {
        let value = self.parse_input(row, input)?;
        let field = self
            .controller(row)
            .ok_or_else(|| ValidationError::read_only(self.id()))?;
        Ok(field.save(value).await)
    }
}
