//! In-memory backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use gridkit_lib::EngineBackends;
use gridkit_lib::TableEngine;
use gridkit_lib::api::OptionSource;
use gridkit_lib::api::RowBackend;
use gridkit_lib::config::EngineConfig;
use gridkit_lib::error::ApiError;
use gridkit_lib::error::Error;
use gridkit_lib::model::ActionSet;
use gridkit_lib::model::BooleanStyle;
use gridkit_lib::model::FieldDescriptor;
use gridkit_lib::model::FieldType;
use gridkit_lib::model::FilterType;
use gridkit_lib::model::Row;
use gridkit_lib::model::RowId;
use gridkit_lib::model::ScopedOption;
use gridkit_lib::model::TableConfig;
use gridkit_lib::presets::PresetBackend;
use gridkit_lib::presets::PresetKind;
use gridkit_lib::presets::SavedPreset;
use gridkit_lib::query::PageResponse;
use gridkit_lib::query::QueryParams;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tokio::sync::Notify;

// =============================================================================
// Rows
// =============================================================================

/// A paginated table of pits.
///
/// Understands `page`, `page_size`, `active_in` and `name_icontains`. PATCH
/// answers with the merged record; `fail_patches` makes it answer 400.
#[derive(Default)]
pub struct MemoryBackend {
    rows: Mutex<Vec<Row>>,
    pub list_calls: Mutex<Vec<QueryParams>>,
    pub patch_calls: Mutex<Vec<(RowId, Map<String, Value>)>>,
    pub patches: AtomicUsize,
    pub fail_patches: AtomicBool,
    pub fail_deletes: Mutex<Vec<RowId>>,
    /// When set, every PATCH waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
    /// Delay before every list answer.
    pub list_delay: Option<Duration>,
}

impl MemoryBackend {
    /// `count` pits with ids 1..=count.
    pub fn with_pits(count: usize) -> Self {
        let rows = (1..=count)
            .map(|i| {
                Row::new()
                    .set("id", i as i64)
                    .set("name", format!("Pit {i}"))
                    .set("depth", i as f64 * 1.5)
                    .set("active", i % 2 == 0)
                    .set("factory", "1")
                    .set("machine", "7")
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn slow_lists(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn row(&self, id: &str) -> Option<Row> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id().as_ref().map(RowId::as_str) == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RowBackend for MemoryBackend {
    async fn list(&self, _endpoint: &str, params: &QueryParams) -> Result<PageResponse, Error> {
        self.list_calls.lock().unwrap().push(params.clone());
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let size: usize = params.get("page_size").and_then(|p| p.parse().ok()).unwrap_or(10);

        let rows: Vec<Row> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| match params.get("active_in") {
                Some(wanted) => {
                    let active = row.get_bool("active").ok().flatten().unwrap_or(false);
                    wanted.split(',').any(|w| w == active.to_string())
                }
                None => true,
            })
            .filter(|row| match params.get("name_icontains") {
                Some(term) => row
                    .get_string("name")
                    .is_some_and(|name| name.to_lowercase().contains(&term.to_lowercase())),
                None => true,
            })
            .cloned()
            .collect();

        let count = rows.len();
        let results = rows.into_iter().skip((page - 1) * size).take(size).collect();
        Ok(PageResponse::new(results, count))
    }

    async fn create(&self, _endpoint: &str, fields: &Map<String, Value>) -> Result<Row, Error> {
        let mut rows = self.rows.lock().unwrap();
        let mut row = Row::from_map(fields.clone());
        row.insert("id", (rows.len() + 1000) as i64);
        rows.push(row.clone());
        Ok(row)
    }

    async fn patch(
        &self,
        _endpoint: &str,
        id: &RowId,
        fields: &Map<String, Value>,
    ) -> Result<Option<Row>, Error> {
        self.patches.fetch_add(1, Ordering::SeqCst);
        self.patch_calls.lock().unwrap().push((id.clone(), fields.clone()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_patches.load(Ordering::SeqCst) {
            return Err(ApiError::from_body(400, r#"{"detail": "depth out of range"}"#).into());
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id().as_ref() == Some(id))
            .ok_or_else(|| ApiError::http(404, "not found"))?;
        for (key, value) in fields {
            row.insert(key.clone(), value.clone());
        }
        if fields.contains_key("machine") {
            row.insert("machine_display", "server label");
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, _endpoint: &str, id: &RowId) -> Result<(), Error> {
        if self.fail_deletes.lock().unwrap().contains(id) {
            return Err(ApiError::http(403, "protected").into());
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id().as_ref() != Some(id));
        if rows.len() == before {
            return Err(ApiError::http(404, "not found").into());
        }
        Ok(())
    }
}

// =============================================================================
// Options
// =============================================================================

/// Option lists by endpoint, with a call counter.
#[derive(Default)]
pub struct MemoryOptions {
    pub lists: Mutex<HashMap<String, Vec<Value>>>,
    pub tags: Mutex<HashMap<(String, String), Vec<String>>>,
    pub calls: AtomicUsize,
}

impl MemoryOptions {
    pub fn with_list(self, endpoint: &str, items: Vec<Value>) -> Self {
        self.lists.lock().unwrap().insert(endpoint.to_string(), items);
        self
    }

    pub fn with_tags(self, scope: &str, model: &str, tags: &[&str]) -> Self {
        self.tags.lock().unwrap().insert(
            (scope.to_string(), model.to_string()),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptionSource for MemoryOptions {
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<ScopedOption>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lists = self.lists.lock().unwrap();
        let items = lists
            .get(endpoint)
            .ok_or_else(|| ApiError::http(404, format!("no list at {endpoint}")))?;
        Ok(items.iter().filter_map(ScopedOption::from_value).collect())
    }

    async fn fetch_tag_suggestions(
        &self,
        _endpoint: &str,
        scope_id: &str,
        model_name: &str,
    ) -> Result<Vec<String>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (scope_id.to_string(), model_name.to_string());
        Ok(self.tags.lock().unwrap().get(&key).cloned().unwrap_or_default())
    }
}

/// The reference data the pit table uses.
pub fn pit_options() -> MemoryOptions {
    MemoryOptions::default()
        .with_list(
            "/api/factories/",
            vec![json!({"id": 1, "name": "North"}), json!({"id": 2, "name": "South"})],
        )
        .with_list(
            "/api/machines/",
            vec![
                json!({"id": "7", "code": "A1", "name": "Press"}),
                json!({"id": "8", "code": "A2"}),
            ],
        )
        .with_tags("1", "pit", &["wet", "deep"])
}

// =============================================================================
// Presets
// =============================================================================

/// Remote preset storage: a list per kind.
#[derive(Default)]
pub struct MemoryPresets {
    stored: Mutex<HashMap<PresetKind, Vec<SavedPreset>>>,
}

impl MemoryPresets {
    /// Stores an entry as-is, e.g. a legacy preset without a storage key.
    pub fn seed(&self, kind: PresetKind, preset: SavedPreset) {
        self.stored.lock().unwrap().entry(kind).or_default().push(preset);
    }
}

#[async_trait]
impl PresetBackend for MemoryPresets {
    async fn list(&self, kind: PresetKind) -> Result<Vec<SavedPreset>, Error> {
        Ok(self.stored.lock().unwrap().get(&kind).cloned().unwrap_or_default())
    }

    async fn save(&self, kind: PresetKind, preset: &SavedPreset) -> Result<(), Error> {
        let mut stored = self.stored.lock().unwrap();
        let list = stored.entry(kind).or_default();
        list.retain(|p| !(p.name == preset.name && p.storage_key == preset.storage_key));
        list.push(preset.clone());
        Ok(())
    }

    async fn delete(&self, kind: PresetKind, name: &str, storage_key: &str) -> Result<(), Error> {
        let mut stored = self.stored.lock().unwrap();
        if let Some(list) = stored.get_mut(&kind) {
            list.retain(|p| !(p.name == name && p.storage_key.as_deref() == Some(storage_key)));
        }
        Ok(())
    }
}

// =============================================================================
// Table
// =============================================================================

/// The pit table: one field of most types.
pub fn pit_config() -> TableConfig {
    TableConfig::new("/api/pits", "pitsTable")
        .field(
            "name",
            FieldDescriptor::new(FieldType::Text).order(1).filter(FilterType::Text),
        )
        .field(
            "depth",
            FieldDescriptor::new(FieldType::Number)
                .order(2)
                .range(Some(0.0), Some(100.0))
                .filter(FilterType::Range),
        )
        .field(
            "active",
            FieldDescriptor::new(FieldType::Boolean)
                .order(3)
                .quick_toggle()
                .display_style(BooleanStyle::Icon)
                .filter(FilterType::Boolean),
        )
        .field(
            "factory",
            FieldDescriptor::new(FieldType::Fk)
                .order(0)
                .api_endpoint("/api/factories/")
                .filter(FilterType::Multiselect),
        )
        .field(
            "machine",
            FieldDescriptor::new(FieldType::Fk)
                .order(4)
                .api_endpoint("/api/machines/")
                .label_template("{code}-{name}")
                .display_field("machine_display")
                .scoped(),
        )
        .field("opened", FieldDescriptor::new(FieldType::Date).order(5))
        .field(
            "labels",
            FieldDescriptor::new(FieldType::Tag)
                .order(6)
                .api_endpoint("/api/tags/")
                .model_name("pit"),
        )
        .ownership_field("factory")
        .row_selection(true)
        .actions(ActionSet {
            expand: true,
            delete: true,
            ..ActionSet::default()
        })
}

pub struct Fixture {
    pub rows: Arc<MemoryBackend>,
    pub options: Arc<MemoryOptions>,
    pub presets: Arc<MemoryPresets>,
}

impl Fixture {
    pub fn new(rows: MemoryBackend) -> Self {
        Self {
            rows: Arc::new(rows),
            options: Arc::new(pit_options()),
            presets: Arc::new(MemoryPresets::default()),
        }
    }

    pub fn backends(&self) -> EngineBackends {
        EngineBackends {
            rows: self.rows.clone(),
            options: self.options.clone(),
            presets: self.presets.clone(),
            beacon: None,
        }
    }

    pub fn engine(&self) -> TableEngine {
        TableEngine::new(pit_config(), EngineConfig::default(), self.backends())
    }
}
