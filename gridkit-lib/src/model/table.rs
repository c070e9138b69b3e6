//! Table configuration supplied by a page

use serde::Deserialize;

use super::FieldDescriptor;
use super::FieldDescriptorMap;

/// Which row actions the actions column offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSet {
    pub edit: bool,
    pub delete: bool,
    pub expand: bool,
    pub share: bool,
    /// Names of page-specific buttons.
    pub custom: Vec<String>,
}

impl ActionSet {
    /// Returns `true` if at least one action is enabled.
    pub fn any(&self) -> bool {
        self.edit || self.delete || self.expand || self.share || !self.custom.is_empty()
    }
}

/// How the global free-text search is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// A plain `search=` parameter.
    #[default]
    Plain,
    /// The search service, advanced query syntax.
    Advanced,
    /// The search service, simple query syntax.
    Simple,
}

/// The declarative configuration a page hands to the engine.
///
/// # Example
///
/// ```
/// use gridkit_lib::model::{FieldDescriptor, FieldType, TableConfig};
///
/// let config = TableConfig::new("/api/pits", "pitsTable")
///     .field("name", FieldDescriptor::new(FieldType::Text).order(1))
///     .field("factory", FieldDescriptor::new(FieldType::Fk).order(0))
///     .ownership_field("factory")
///     .row_selection(true);
///
/// assert_eq!(config.fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    /// The REST list endpoint, e.g. `/api/pits`.
    pub endpoint: String,
    /// Scope key for saved presets.
    pub storage_key: String,
    /// The field matrix.
    pub fields: FieldDescriptorMap,
    /// The field that defines the reference-data scope (e.g. the factory).
    pub ownership_field: Option<String>,
    pub enable_row_selection: bool,
    pub actions: ActionSet,
    pub search_mode: SearchMode,
    pub approximate_search: bool,
    /// Page size override; the engine default applies when unset.
    pub page_size: Option<usize>,
    /// Endpoint for fire-and-forget usage beacons.
    pub beacon_path: Option<String>,
}

impl TableConfig {
    pub fn new(endpoint: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            storage_key: storage_key.into(),
            ..Self::default()
        }
    }

    /// Adds a field to the matrix (builder pattern).
    pub fn field(mut self, key: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(key.into(), descriptor);
        self
    }

    pub fn ownership_field(mut self, key: impl Into<String>) -> Self {
        self.ownership_field = Some(key.into());
        self
    }

    pub fn row_selection(mut self, enabled: bool) -> Self {
        self.enable_row_selection = enabled;
        self
    }

    pub fn actions(mut self, actions: ActionSet) -> Self {
        self.actions = actions;
        self
    }

    pub fn search_mode(mut self, mode: SearchMode, approximate: bool) -> Self {
        self.search_mode = mode;
        self.approximate_search = approximate;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn beacon_path(mut self, path: impl Into<String>) -> Self {
        self.beacon_path = Some(path.into());
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
