//! OptimisticField

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use super::FieldCallbacks;
use super::PayloadShape;
use crate::api::RowBackend;
use crate::error::MutationError;
use crate::error::MutationKind;
use crate::model::Row;
use crate::model::RowId;

/// Whether a save is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    Idle,
    Saving,
}

/// How a [`OptimisticField::save`] call ended.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    /// Another save was in flight; nothing happened.
    Rejected,
    /// The backend accepted the value. Carries the full record if it sent one.
    Committed(Option<Row>),
    /// The backend rejected the value; the previous value is back.
    Reverted(MutationError),
}

impl SaveOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

#[derive(Debug)]
struct Slot {
    current: Value,
    original: Value,
    phase: FieldPhase,
}

/// Edit controller for one cell.
///
/// # Example
///
/// ```ignore
/// let field = OptimisticField::new(
///     RowId::from("7"),
///     "/api/pits",
///     PayloadShape::Plain("depth".into()),
///     json!(3.0),
///     backend,
///     callbacks,
/// );
///
/// match field.save(json!(4.5)).await {
///     SaveOutcome::Committed(_) => {}
///     SaveOutcome::Reverted(e) => eprintln!("{e}"),
///     SaveOutcome::Rejected => {}
/// }
/// ```
pub struct OptimisticField {
    record_id: RowId,
    endpoint: String,
    shape: PayloadShape,
    backend: Arc<dyn RowBackend>,
    callbacks: FieldCallbacks,
    slot: Mutex<Slot>,
}

impl OptimisticField {
    pub fn new(
        record_id: RowId,
        endpoint: impl Into<String>,
        shape: PayloadShape,
        initial: Value,
        backend: Arc<dyn RowBackend>,
        callbacks: FieldCallbacks,
    ) -> Self {
        Self {
            record_id,
            endpoint: endpoint.into(),
            shape,
            backend,
            callbacks,
            slot: Mutex::new(Slot {
                current: initial.clone(),
                original: initial,
                phase: FieldPhase::Idle,
            }),
        }
    }

    pub fn record_id(&self) -> &RowId {
        &self.record_id
    }

    pub fn field_key(&self) -> &str {
        self.shape.key()
    }

    pub fn current(&self) -> Value {
        self.lock().current.clone()
    }

    /// The value before the save in flight (or the last committed value).
    pub fn original(&self) -> Value {
        self.lock().original.clone()
    }

    pub fn phase(&self) -> FieldPhase {
        self.lock().phase
    }

    pub fn is_saving(&self) -> bool {
        self.phase() == FieldPhase::Saving
    }

    /// Takes a value from a fresh row while no save is in flight.
    ///
    /// Returns `false` (and changes nothing) while saving.
    pub fn observe(&self, value: Value) -> bool {
        let mut slot = self.lock();
        if slot.phase == FieldPhase::Saving {
            return false;
        }
        slot.original = value.clone();
        slot.current = value;
        true
    }

    /// Applies `value` locally, then persists it.
    ///
    /// Dropping the returned future before it settles reverts the value, the
    /// same as a failed request.
    pub async fn save(&self, value: Value) -> SaveOutcome {
        let key = self.shape.key();
        {
            let mut slot = self.lock();
            if slot.phase == FieldPhase::Saving {
                log::debug!("save of {}.{key} rejected: already saving", self.record_id);
                return SaveOutcome::Rejected;
            }
            slot.original = std::mem::replace(&mut slot.current, value.clone());
            slot.phase = FieldPhase::Saving;
        }
        let guard = SaveGuard { field: self, armed: true };

        self.callbacks.update(&self.record_id, key, &value);

        let payload = self.shape.payload(&value);
        let result = self
            .backend
            .patch(&self.endpoint, &self.record_id, &payload)
            .await;
        guard.disarm();

        match result {
            Ok(record) => {
                {
                    let mut slot = self.lock();
                    if let Some(server_value) = record.as_ref().and_then(|r| r.get(key)) {
                        slot.current = server_value.clone();
                    }
                    slot.original = slot.current.clone();
                    slot.phase = FieldPhase::Idle;
                }
                if let Some(record) = &record {
                    self.callbacks.reconcile(record);
                }
                self.callbacks.success(&self.record_id, key);
                SaveOutcome::Committed(record)
            }
            Err(e) => {
                let original = self.revert();
                log::warn!("save of {}.{key} failed, reverting: {e}", self.record_id);
                self.callbacks.update(&self.record_id, key, &original);

                let error = MutationError::from_error(
                    Some(self.record_id.clone()),
                    MutationKind::Update,
                    Some(key),
                    &e,
                );
                self.callbacks.error(&error);
                SaveOutcome::Reverted(error)
            }
        }
    }

    /// Puts the pre-save value back and returns it.
    fn revert(&self) -> Value {
        let mut slot = self.lock();
        slot.current = slot.original.clone();
        slot.phase = FieldPhase::Idle;
        slot.original.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Reverts a save whose future was dropped while the request was in flight.
struct SaveGuard<'a> {
    field: &'a OptimisticField,
    armed: bool,
}

impl SaveGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let field = self.field;
        let key = field.shape.key();
        let original = field.revert();
        log::warn!("save of {}.{key} abandoned, reverting", field.record_id);
        field.callbacks.update(&field.record_id, key, &original);
    }
}

impl std::fmt::Debug for OptimisticField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticField")
            .field("record_id", &self.record_id)
            .field("shape", &self.shape)
            .field("slot", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::error::Error;
    use crate::query::PageResponse;
    use crate::query::QueryParams;
    use async_trait::async_trait;
    use serde_json::Map;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Answers every PATCH with the given status; 200 echoes the body plus a label.
    struct PatchBackend {
        status: u16,
        calls: AtomicUsize,
        /// When set, every PATCH waits for a permit.
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl RowBackend for PatchBackend {
        async fn list(&self, _: &str, _: &QueryParams) -> Result<PageResponse, Error> {
            Ok(PageResponse::default())
        }

        async fn create(&self, _: &str, _: &Map<String, Value>) -> Result<Row, Error> {
            Ok(Row::new())
        }

        async fn patch(
            &self,
            _: &str,
            id: &RowId,
            fields: &Map<String, Value>,
        ) -> Result<Option<Row>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.status >= 400 {
                return Err(ApiError::from_body(self.status, r#"{"detail": "nope"}"#).into());
            }
            let mut row = Row::from_map(fields.clone()).set("id", id.as_str());
            row.insert("kiln_label", "Kiln B");
            Ok(Some(row))
        }

        async fn delete(&self, _: &str, _: &RowId) -> Result<(), Error> {
            Ok(())
        }
    }

    fn field(status: u16, updates: Arc<Mutex<Vec<Value>>>) -> (OptimisticField, Arc<PatchBackend>) {
        gated_field(status, updates, None)
    }

    fn gated_field(
        status: u16,
        updates: Arc<Mutex<Vec<Value>>>,
        gate: Option<Arc<Notify>>,
    ) -> (OptimisticField, Arc<PatchBackend>) {
        let backend = Arc::new(PatchBackend {
            status,
            calls: AtomicUsize::new(0),
            gate,
        });
        let callbacks = FieldCallbacks::new().on_update(move |_, _, value| {
            updates.lock().unwrap().push(value.clone());
        });
        let field = OptimisticField::new(
            RowId::from("7"),
            "/api/pits",
            PayloadShape::Plain("kiln".into()),
            json!("a"),
            backend.clone(),
            callbacks,
        );
        (field, backend)
    }

    #[tokio::test]
    async fn test_commit_reconciles_record() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let (field, _) = field(200, updates.clone());

        let outcome = field.save(json!("b")).await;

        let SaveOutcome::Committed(Some(record)) = outcome else {
            panic!("expected a committed record");
        };
        assert_eq!(record.get_str("kiln_label").unwrap(), Some("Kiln B"));
        assert_eq!(field.current(), json!("b"));
        assert_eq!(field.phase(), FieldPhase::Idle);
        assert_eq!(*updates.lock().unwrap(), [json!("b")]);
    }

    #[tokio::test]
    async fn test_failure_reverts() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let (field, _) = field(400, updates.clone());

        let outcome = field.save(json!("b")).await;

        let SaveOutcome::Reverted(error) = outcome else {
            panic!("expected a revert");
        };
        assert_eq!(error.message, "nope");
        assert_eq!(error.operation, MutationKind::Update);
        assert_eq!(field.current(), json!("a"));
        assert_eq!(*updates.lock().unwrap(), [json!("b"), json!("a")]);
    }

    #[tokio::test]
    async fn test_observe_ignored_while_saving() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let (field, _) = field(200, updates);

        assert!(field.observe(json!("z")));
        assert_eq!(field.original(), json!("z"));

        field.lock().phase = FieldPhase::Saving;
        assert!(!field.observe(json!("y")));
        assert!(field.save(json!("x")).await.is_rejected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_save_reverts() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(Notify::new());
        let (field, backend) = gated_field(200, updates.clone(), Some(gate.clone()));

        let timed_out = tokio::time::timeout(Duration::from_millis(10), field.save(json!("b"))).await;
        assert!(timed_out.is_err());

        assert_eq!(field.phase(), FieldPhase::Idle);
        assert_eq!(field.current(), json!("a"));
        assert_eq!(*updates.lock().unwrap(), [json!("b"), json!("a")]);
        assert!(field.observe(json!("c")));

        gate.notify_one();
        assert!(field.save(json!("d")).await.is_committed());
        assert_eq!(field.current(), json!("d"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
