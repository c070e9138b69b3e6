//! Table engine facade
//!
//! [`TableEngine`] owns everything one mounted table needs for its whole
//! lifetime: the compiled field matrix, the current page, selection and
//! expansion, table state (page, sort, filters, search), the reference-data
//! caches, the per-cell edit controllers and the preset stores.
//!
//! ```text
//! TableConfig --compile--> CompiledMatrix --build--> ColumnDefinition
//!      |                                                   |
//!   table state --build_query_params--> RowBackend::list   | render / edit
//!                                            |             v
//!                                        RowStore <-- OptimisticField
//! ```
//!
//! # Example
//!
//! ```ignore
//! let engine = Arc::new(TableEngine::with_client(config, EngineConfig::default(), client)
//!     .with_error_reporter(|e| eprintln!("{e}")));
//!
//! engine.load_reference_data().await?;
//! engine.refresh().await?;
//!
//! for row in engine.rows() {
//!     for column in engine.columns() {
//!         println!("{}: {}", column.header(), column.render(&row).plain_text());
//!     }
//! }
//! ```

mod edit;
mod fetch;
mod presets;

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Value;
use serde_json::json;

use crate::GridClient;
use crate::api::Beacon;
use crate::api::BeaconTransport;
use crate::api::OptionSource;
use crate::api::RowBackend;
use crate::cache::OptionList;
use crate::cache::ScopedOptionsCache;
use crate::cache::TagSuggestionCache;
use crate::column;
use crate::column::ColumnContext;
use crate::column::ColumnDefinition;
use crate::column::ColumnSpec;
use crate::column::ColumnState;
use crate::column::EditingCell;
use crate::compile::ACTIONS_COLUMN;
use crate::compile::CompiledMatrix;
use crate::compile::SELECTION_COLUMN;
use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::error::Error;
use crate::error::MutationError;
use crate::model::FilterState;
use crate::model::Row;
use crate::model::RowId;
use crate::model::Sort;
use crate::model::TableConfig;
use crate::optimistic::FieldCallbacks;
use crate::optimistic::FieldRegistry;
use crate::presets::PresetBackend;
use crate::presets::PresetKind;
use crate::presets::PresetStore;
use crate::query::FieldMeta;
use crate::query::Pagination;
use crate::rows::RowSelection;
use crate::rows::RowStore;

/// Receives every server-rejected create, update and delete.
pub type ErrorReporter = Arc<dyn Fn(&MutationError) + Send + Sync>;

/// The collaborators an engine talks to.
#[derive(Clone)]
pub struct EngineBackends {
    pub rows: Arc<dyn RowBackend>,
    pub options: Arc<dyn OptionSource>,
    pub presets: Arc<dyn PresetBackend>,
    /// Usage beacons; `None` disables them.
    pub beacon: Option<Arc<dyn BeaconTransport>>,
}

impl EngineBackends {
    /// Uses one REST client for everything.
    pub fn from_client(client: &GridClient) -> Self {
        let client = Arc::new(client.clone());
        Self {
            rows: client.clone(),
            options: client.clone(),
            presets: client.clone(),
            beacon: Some(client),
        }
    }

    /// Replaces the preset backend (builder pattern).
    pub fn with_presets(mut self, presets: Arc<dyn PresetBackend>) -> Self {
        self.presets = presets;
        self
    }
}

/// Table state driven by the user.
#[derive(Debug)]
struct ViewState {
    pagination: Pagination,
    sorting: Option<Sort>,
    filters: FilterState,
    global_filter: String,
    editing: Option<EditingCell>,
    columns: ColumnState,
    selection: RowSelection,
    expanded: HashSet<RowId>,
    /// Last validation message per cell.
    validation: HashMap<(RowId, String), String>,
}

/// One mounted table.
pub struct TableEngine {
    config: TableConfig,
    settings: EngineConfig,
    matrix: CompiledMatrix,
    meta: FieldMeta,
    backends: EngineBackends,

    rows: Arc<RowStore>,
    view: RwLock<ViewState>,

    fk_options: RwLock<HashMap<String, OptionList>>,
    scoped_cache: Arc<ScopedOptionsCache>,
    tag_cache: Arc<TagSuggestionCache>,
    controllers: Arc<FieldRegistry>,

    filter_presets: PresetStore,
    column_presets: PresetStore,

    beacon: Option<Beacon>,
    debouncer: Debouncer,
    error_reporter: Option<ErrorReporter>,
}

impl TableEngine {
    /// Compiles `config` and sets up empty state.
    pub fn new(config: TableConfig, settings: EngineConfig, backends: EngineBackends) -> Self {
        let matrix = CompiledMatrix::compile(&config.fields);
        let meta = FieldMeta::from_config(&config);
        let page_size = config.page_size.unwrap_or(settings.default_page_size);
        let columns = ColumnState::new(&matrix, config.enable_row_selection, config.actions.any());

        let beacon = match (&backends.beacon, &config.beacon_path) {
            (Some(transport), Some(path)) => Some(Beacon::new(transport.clone(), path.clone())),
            _ => None,
        };

        log::debug!(
            "compiled table '{}' with {} fields",
            config.storage_key,
            matrix.field_configs.len()
        );

        Self {
            rows: Arc::new(RowStore::new(settings.fetch_ordering).with_timeout(settings.request_timeout)),
            view: RwLock::new(ViewState {
                pagination: Pagination::new(0, page_size),
                sorting: None,
                filters: FilterState::default(),
                global_filter: String::new(),
                editing: None,
                columns,
                selection: RowSelection::new(),
                expanded: HashSet::new(),
                validation: HashMap::new(),
            }),
            fk_options: RwLock::new(HashMap::new()),
            scoped_cache: Arc::new(ScopedOptionsCache::new()),
            tag_cache: Arc::new(TagSuggestionCache::new()),
            controllers: Arc::new(FieldRegistry::new()),
            filter_presets: PresetStore::new(backends.presets.clone(), PresetKind::Filters),
            column_presets: PresetStore::new(backends.presets.clone(), PresetKind::Columns),
            beacon,
            debouncer: Debouncer::new(),
            error_reporter: None,
            config,
            settings,
            matrix,
            meta,
            backends,
        }
    }

    /// An engine backed by one REST client.
    pub fn with_client(config: TableConfig, settings: EngineConfig, client: GridClient) -> Self {
        Self::new(config, settings, EngineBackends::from_client(&client))
    }

    /// Sets the reporter for rejected writes (builder pattern).
    pub fn with_error_reporter(mut self, f: impl Fn(&MutationError) + Send + Sync + 'static) -> Self {
        self.error_reporter = Some(Arc::new(f));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    pub fn matrix(&self) -> &CompiledMatrix {
        &self.matrix
    }

    pub fn row_store(&self) -> &RowStore {
        &self.rows
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.rows()
    }

    pub fn row(&self, id: &RowId) -> Option<Row> {
        self.rows.row(id)
    }

    /// Total row count reported by the backend.
    pub fn count(&self) -> usize {
        self.rows.count()
    }

    pub fn is_loading(&self) -> bool {
        self.rows.is_loading()
    }

    /// The last page fetch error.
    pub fn error(&self) -> Option<String> {
        self.rows.error()
    }

    pub fn scoped_cache(&self) -> &ScopedOptionsCache {
        &self.scoped_cache
    }

    pub fn tag_cache(&self) -> &TagSuggestionCache {
        &self.tag_cache
    }

    pub fn controllers(&self) -> &FieldRegistry {
        &self.controllers
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// The dependency bundle for this render.
    pub fn context(&self) -> ColumnContext {
        let fk_options = self.read_options(|options| options.clone());
        let mut ctx = self.read_view(|view| {
            ColumnContext::new(self.backends.rows.clone(), self.config.endpoint.clone())
                .with_editing(view.editing.clone())
                .with_highlight(view.global_filter.clone())
                .with_selected(view.selection.ids().clone())
                .with_expanded(view.expanded.clone())
        });

        ctx.callbacks = self.field_callbacks();
        ctx.controllers = self.controllers.clone();
        ctx.fk_options = Arc::new(fk_options);
        ctx.scoped_cache = self.scoped_cache.clone();
        ctx.tag_cache = self.tag_cache.clone();
        ctx.ownership_field = self.config.ownership_field.clone();
        ctx.date_display = self.settings.date_display;
        ctx
    }

    /// The visible columns in display order.
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        let ctx = self.context();
        self.read_view(|view| view.columns.visible_columns())
            .into_iter()
            .filter_map(|id| self.spec_for(&id))
            .map(|spec| column::build(spec, &ctx))
            .collect()
    }

    /// The column for one id, visible or not.
    pub fn column(&self, id: &str) -> Result<ColumnDefinition, Error> {
        let spec = self
            .spec_for(id)
            .ok_or_else(|| Error::UnknownField(id.to_string()))?;
        Ok(column::build(spec, &self.context()))
    }

    fn spec_for(&self, id: &str) -> Option<ColumnSpec> {
        match id {
            SELECTION_COLUMN if self.config.enable_row_selection => Some(ColumnSpec::Selection),
            ACTIONS_COLUMN if self.config.actions.any() => {
                Some(ColumnSpec::Actions(self.config.actions.clone()))
            }
            _ => self.matrix.field(id).cloned().map(ColumnSpec::Field),
        }
    }

    /// Shows or hides a column in the column panel.
    pub fn set_column_visible(&self, key: &str, visible: bool) -> bool {
        self.update_view(|view| view.columns.set_visible(key, visible))
    }

    pub fn move_column(&self, key: &str, index: usize) -> bool {
        self.update_view(|view| view.columns.move_column(key, index))
    }

    pub fn reset_columns(&self) {
        self.update_view(|view| view.columns.reset());
    }

    pub fn column_state(&self) -> ColumnState {
        self.read_view(|view| view.columns.clone())
    }

    // =========================================================================
    // Selection and expansion
    // =========================================================================

    pub fn toggle_selection(&self, id: &RowId) -> bool {
        self.update_view(|view| view.selection.toggle(id))
    }

    /// Header checkbox over the current page.
    pub fn toggle_all(&self) {
        let page = self.rows.page_ids();
        self.update_view(|view| view.selection.toggle_all(&page));
    }

    pub fn is_all_selected(&self) -> bool {
        let page = self.rows.page_ids();
        self.read_view(|view| view.selection.is_all_selected(&page))
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.read_view(|view| view.selection.ids().iter().cloned().collect());
        ids.sort();
        ids
    }

    pub fn clear_selection(&self) {
        self.update_view(|view| view.selection.clear());
    }

    /// Expands or collapses a row's detail view. Returns the new state.
    pub fn toggle_expanded(&self, id: &RowId) -> bool {
        self.update_view(|view| {
            if view.expanded.remove(id) {
                false
            } else {
                view.expanded.insert(id.clone());
                true
            }
        })
    }

    pub fn is_expanded(&self, id: &RowId) -> bool {
        self.read_view(|view| view.expanded.contains(id))
    }

    /// `(header, content)` for every field of a row, rendered by the same
    /// column renderers as the grid cells.
    pub fn expanded_detail(&self, id: &RowId) -> Result<Vec<(String, column::CellContent)>, Error> {
        let row = self.require_row(id)?;
        let ctx = self.context().with_editing(None);
        Ok(self
            .matrix
            .field_configs
            .iter()
            .map(|config| {
                let column = column::build(ColumnSpec::Field(config.clone()), &ctx);
                (config.header.clone(), column.render(&row))
            })
            .collect())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn field_callbacks(&self) -> FieldCallbacks {
        let rows = self.rows.clone();
        let reconcile_rows = self.rows.clone();
        let reporter = self.error_reporter.clone();
        let beacon = self.beacon.clone();
        let table = self.config.storage_key.clone();

        FieldCallbacks::new()
            .on_update(move |id, field, value| {
                rows.set_field(id, field, value.clone());
            })
            .on_reconcile(move |record| {
                reconcile_rows.update_full_record(record);
            })
            .on_error(move |error| {
                if let Some(report) = &reporter {
                    report(error);
                }
            })
            .on_success(move |id, field| {
                if let Some(beacon) = &beacon {
                    beacon.fire(json!({
                        "event": "cell_edit",
                        "table": table,
                        "record": id,
                        "field": field,
                    }));
                }
            })
    }

    fn report(&self, error: &MutationError) {
        if let Some(report) = &self.error_reporter {
            report(error);
        }
    }

    fn fire_beacon(&self, event: Value) {
        if let Some(beacon) = &self.beacon {
            beacon.fire(event);
        }
    }

    fn require_row(&self, id: &RowId) -> Result<Row, Error> {
        self.rows
            .row(id)
            .ok_or_else(|| Error::UnknownRow(id.to_string()))
    }

    fn read_view<T>(&self, f: impl FnOnce(&ViewState) -> T) -> T {
        let guard = self.view.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update_view<T>(&self, f: impl FnOnce(&mut ViewState) -> T) -> T {
        let mut guard = self.view.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    fn read_options<T>(&self, f: impl FnOnce(&HashMap<String, OptionList>) -> T) -> T {
        let guard = self.fk_options.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update_options(&self, f: impl FnOnce(&mut HashMap<String, OptionList>)) {
        let mut guard = self.fk_options.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl std::fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEngine")
            .field("endpoint", &self.config.endpoint)
            .field("storage_key", &self.config.storage_key)
            .field("settings", &self.settings)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}
