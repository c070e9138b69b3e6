//! Callbacks a field controller reports through

use std::sync::Arc;

use serde_json::Value;

use crate::error::MutationError;
use crate::model::Row;
use crate::model::RowId;

pub type UpdateCallback = Arc<dyn Fn(&RowId, &str, &Value) + Send + Sync>;
pub type ReconcileCallback = Arc<dyn Fn(&Row) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&MutationError) + Send + Sync>;
pub type SuccessCallback = Arc<dyn Fn(&RowId, &str) + Send + Sync>;

/// Where a controller reports value changes and outcomes.
///
/// Every callback is optional.
#[derive(Clone, Default)]
pub struct FieldCallbacks {
    /// Row-level value update; fires on the optimistic apply and on revert.
    pub on_update: Option<UpdateCallback>,
    /// Full-record reconciliation after a successful save.
    pub on_reconcile: Option<ReconcileCallback>,
    /// Error reporter for rejected saves.
    pub on_error: Option<ErrorCallback>,
    /// Observability hook after a successful save.
    pub on_success: Option<SuccessCallback>,
}

impl FieldCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update(mut self, f: impl Fn(&RowId, &str, &Value) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_reconcile(mut self, f: impl Fn(&Row) + Send + Sync + 'static) -> Self {
        self.on_reconcile = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&MutationError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_success(mut self, f: impl Fn(&RowId, &str) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub(crate) fn update(&self, id: &RowId, field: &str, value: &Value) {
        if let Some(f) = &self.on_update {
            f(id, field, value);
        }
    }

    pub(crate) fn reconcile(&self, row: &Row) {
        if let Some(f) = &self.on_reconcile {
            f(row);
        }
    }

    pub(crate) fn error(&self, error: &MutationError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }

    pub(crate) fn success(&self, id: &RowId, field: &str) {
        if let Some(f) = &self.on_success {
            f(id, field);
        }
    }
}

impl std::fmt::Debug for FieldCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCallbacks")
            .field("on_update", &self.on_update.is_some())
            .field("on_reconcile", &self.on_reconcile.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}
