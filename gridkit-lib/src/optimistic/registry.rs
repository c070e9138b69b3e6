//! Controllers shared across renders

use std::sync::Arc;

use dashmap::DashMap;

use super::OptimisticField;
use crate::model::RowId;

/// Keeps one [`OptimisticField`] per `(record id, field key)`.
///
/// Column definitions are rebuilt on every render; the registry makes sure
/// a cell keeps its controller (and its in-flight state) across rebuilds.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: DashMap<(RowId, String), Arc<OptimisticField>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the controller for a cell, creating it with `create` on first use.
    pub fn get_or_create(
        &self,
        id: &RowId,
        field_key: &str,
        create: impl FnOnce() -> OptimisticField,
    ) -> Arc<OptimisticField> {
        self.fields
            .entry((id.clone(), field_key.to_string()))
            .or_insert_with(|| Arc::new(create()))
            .clone()
    }

    pub fn get(&self, id: &RowId, field_key: &str) -> Option<Arc<OptimisticField>> {
        self.fields
            .get(&(id.clone(), field_key.to_string()))
            .map(|entry| entry.clone())
    }

    /// Drops the controllers of removed records.
    pub fn remove_record(&self, id: &RowId) {
        self.fields.retain(|(record, _), _| record != id);
    }

    /// Drops idle controllers; in-flight saves keep theirs.
    pub fn retain_saving(&self) {
        self.fields.retain(|_, field| field.is_saving());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
