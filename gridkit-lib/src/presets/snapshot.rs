//! The state captured by a preset

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::PresetKind;
use crate::model::FilterState;
use crate::model::Sort;

/// Filter, sort and column state of one table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSnapshot {
    pub filters: FilterState,
    pub sorting: Option<Sort>,
    pub column_visibility: BTreeMap<String, bool>,
    pub column_order: Vec<String>,
    pub page_size: Option<usize>,
    pub global_filter: String,
}

impl TableSnapshot {
    /// The part of the snapshot a preset of `kind` stores.
    pub fn for_kind(&self, kind: PresetKind) -> Self {
        match kind {
            PresetKind::Filters => Self {
                filters: self.filters.clone(),
                sorting: self.sorting.clone(),
                global_filter: self.global_filter.clone(),
                ..Self::default()
            },
            PresetKind::Columns => Self {
                column_visibility: self.column_visibility.clone(),
                column_order: self.column_order.clone(),
                page_size: self.page_size,
                ..Self::default()
            },
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
