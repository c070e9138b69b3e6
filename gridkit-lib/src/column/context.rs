//! Dependencies handed to the column factory

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::RowBackend;
use crate::cache::OptionList;
use crate::cache::ScopedOptionsCache;
use crate::cache::TagSuggestionCache;
use crate::config::DateDisplay;
use crate::model::RowId;
use crate::optimistic::FieldCallbacks;
use crate::optimistic::FieldRegistry;

/// The one cell that is in edit mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditingCell {
    pub row_id: RowId,
    pub field_key: String,
}

impl EditingCell {
    pub fn new(row_id: impl Into<RowId>, field_key: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            field_key: field_key.into(),
        }
    }

    pub fn is(&self, row_id: &RowId, field_key: &str) -> bool {
        &self.row_id == row_id && self.field_key == field_key
    }
}

/// Everything a column needs besides its own config.
///
/// Built explicitly by the owner of the table (usually
/// [`TableEngine`](crate::engine::TableEngine)) and shared by every column
/// of one render.
#[derive(Clone)]
pub struct ColumnContext {
    /// REST endpoint of the table, for cell saves.
    pub endpoint: String,
    pub backend: Arc<dyn RowBackend>,
    pub callbacks: FieldCallbacks,
    pub controllers: Arc<FieldRegistry>,

    pub editing: Option<EditingCell>,
    /// Search term highlighted in text cells.
    pub highlight: Option<String>,

    /// Preloaded option lists for unscoped foreign keys, by field key.
    pub fk_options: Arc<HashMap<String, OptionList>>,
    pub scoped_cache: Arc<ScopedOptionsCache>,
    pub tag_cache: Arc<TagSuggestionCache>,
    /// The field that defines the reference-data scope.
    pub ownership_field: Option<String>,

    pub selected: Arc<HashSet<RowId>>,
    pub expanded: Arc<HashSet<RowId>>,

    pub date_display: DateDisplay,
}

impl ColumnContext {
    /// A context with empty state and no callbacks.
    pub fn new(backend: Arc<dyn RowBackend>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            backend,
            callbacks: FieldCallbacks::default(),
            controllers: Arc::new(FieldRegistry::new()),
            editing: None,
            highlight: None,
            fk_options: Arc::new(HashMap::new()),
            scoped_cache: Arc::new(ScopedOptionsCache::new()),
            tag_cache: Arc::new(TagSuggestionCache::new()),
            ownership_field: None,
            selected: Arc::new(HashSet::new()),
            expanded: Arc::new(HashSet::new()),
            date_display: DateDisplay::default(),
        }
    }

    pub fn with_editing(mut self, editing: Option<EditingCell>) -> Self {
        self.editing = editing;
        self
    }

    pub fn with_highlight(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.highlight = (!term.trim().is_empty()).then_some(term);
        self
    }

    pub fn with_fk_options(mut self, field_key: impl Into<String>, options: OptionList) -> Self {
        Arc::make_mut(&mut self.fk_options).insert(field_key.into(), options);
        self
    }

    pub fn with_ownership_field(mut self, field: impl Into<String>) -> Self {
        self.ownership_field = Some(field.into());
        self
    }

    pub fn with_callbacks(mut self, callbacks: FieldCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_selected(mut self, selected: HashSet<RowId>) -> Self {
        self.selected = Arc::new(selected);
        self
    }

    pub fn with_expanded(mut self, expanded: HashSet<RowId>) -> Self {
        self.expanded = Arc::new(expanded);
        self
    }

    pub fn with_date_display(mut self, display: DateDisplay) -> Self {
        self.date_display = display;
        self
    }

    pub(crate) fn is_editing(&self, row_id: &RowId, field_key: &str) -> bool {
        self.editing
            .as_ref()
            .is_some_and(|cell| cell.is(row_id, field_key))
    }
}

impl std::fmt::Debug for ColumnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnContext")
            .field("endpoint", &self.endpoint)
            .field("editing", &self.editing)
            .field("highlight", &self.highlight)
            .field("ownership_field", &self.ownership_field)
            .finish_non_exhaustive()
    }
}
