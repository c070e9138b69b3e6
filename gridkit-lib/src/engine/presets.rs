//! Snapshots and saved presets

use serde_json::json;

use super::TableEngine;
use crate::error::Error;
use crate::presets::PresetKind;
use crate::presets::PresetStore;
use crate::presets::SavedPreset;
use crate::presets::TableSnapshot;
use crate::query::Pagination;
use crate::rows::FetchOutcome;

impl TableEngine {
    /// The current filter, sort and column state.
    pub fn snapshot(&self) -> TableSnapshot {
        self.read_view(|view| TableSnapshot {
            filters: view.filters.clone(),
            sorting: view.sorting.clone(),
            column_visibility: view.columns.visibility().clone(),
            column_order: view.columns.data_order().to_vec(),
            page_size: Some(view.pagination.page_size),
            global_filter: view.global_filter.clone(),
        })
    }

    /// Applies the `kind` part of a snapshot without fetching.
    ///
    /// Filters for fields that are no longer in the matrix are dropped.
    pub fn restore(&self, kind: PresetKind, snapshot: TableSnapshot) {
        let snapshot = snapshot.for_kind(kind);
        self.update_view(|view| match kind {
            PresetKind::Filters => {
                view.filters = snapshot
                    .filters
                    .iter()
                    .filter(|filter| self.matrix.field(&filter.field_key).is_some())
                    .cloned()
                    .collect();
                view.sorting = snapshot
                    .sorting
                    .filter(|sort| self.matrix.field(&sort.field).is_some());
                view.global_filter = snapshot.global_filter;
                view.pagination.page_index = 0;
            }
            PresetKind::Columns => {
                view.columns
                    .restore(&snapshot.column_visibility, &snapshot.column_order);
                if let Some(size) = snapshot.page_size.filter(|size| *size > 0) {
                    view.pagination = Pagination::new(0, size);
                }
            }
        });
    }

    /// The preset store of one kind.
    pub fn presets(&self, kind: PresetKind) -> &PresetStore {
        match kind {
            PresetKind::Filters => &self.filter_presets,
            PresetKind::Columns => &self.column_presets,
        }
    }

    /// Loads both preset lists for this table's storage key.
    pub async fn load_presets(&self) -> Result<(), Error> {
        let key = &self.config.storage_key;
        let (filters, columns) = futures::join!(
            self.filter_presets.load(key),
            self.column_presets.load(key)
        );
        filters?;
        columns?;
        Ok(())
    }

    /// Saves the current state as a named preset.
    pub async fn save_preset(&self, kind: PresetKind, name: &str) -> Result<(), Error> {
        let state = self.snapshot().for_kind(kind).to_value()?;
        self.presets(kind)
            .save(name, state, &self.config.storage_key)
            .await
    }

    /// Restores a loaded preset and fetches the page it describes.
    pub async fn apply_preset(&self, kind: PresetKind, name: &str) -> Result<FetchOutcome, Error> {
        let preset: SavedPreset = self
            .presets(kind)
            .get(name)
            .ok_or_else(|| Error::InvalidOperation(format!("no {} preset named '{name}'", kind.as_str())))?;
        let snapshot = TableSnapshot::from_value(preset.state)?;

        log::info!("applying {} preset '{name}'", kind.as_str());
        self.restore(kind, snapshot);
        self.fire_beacon(json!({
            "event": "apply_preset",
            "table": self.config.storage_key,
            "kind": kind.as_str(),
        }));
        self.refresh().await
    }

    pub async fn delete_preset(&self, kind: PresetKind, name: &str) -> Result<(), Error> {
        self.presets(kind)
            .delete(name, &self.config.storage_key)
            .await
    }
}
