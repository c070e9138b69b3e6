//! Preset store
//!
//! Named, persisted snapshots of filter or column state, scoped by a
//! table's storage key. [`PresetStore`] is the CRUD facade; persistence is
//! delegated to a [`PresetBackend`]: the REST backend
//! ([`GridClient`](crate::GridClient)) or a local [`SqlitePresetBackend`].

mod snapshot;
mod sqlite;
mod store;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

pub use snapshot::TableSnapshot;
pub use sqlite::SqlitePresetBackend;
pub use store::PresetStore;

use crate::error::Error;

/// What a preset captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    Filters,
    Columns,
}

impl PresetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filters => "filters",
            Self::Columns => "columns",
        }
    }

    /// The remote collection, `/api/user/{filters|columns}/`.
    pub fn path(&self) -> String {
        format!("/api/user/{}/", self.as_str())
    }
}

/// A named snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPreset {
    pub name: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// The serialized filter/column/sort snapshot.
    pub state: Value,
    /// Scope key. Legacy entries have none.
    #[serde(default, alias = "storageKey", skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl SavedPreset {
    /// A preset stamped with the current time.
    pub fn new(name: impl Into<String>, state: Value, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
            state,
            storage_key: Some(storage_key.into()),
        }
    }
}

/// Accepts RFC 3339 strings or epoch milliseconds.
fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {n}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected a timestamp, got {other}"
        ))),
    }
}

/// Where presets are persisted.
///
/// `list` returns every preset of a kind; scoping by storage key happens in
/// [`PresetStore`] so legacy entries can still be matched.
#[async_trait]
pub trait PresetBackend: Send + Sync {
    async fn list(&self, kind: PresetKind) -> Result<Vec<SavedPreset>, Error>;

    async fn save(&self, kind: PresetKind, preset: &SavedPreset) -> Result<(), Error>;

    async fn delete(&self, kind: PresetKind, name: &str, storage_key: &str) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preset_timestamp_forms() {
        let iso: SavedPreset = serde_json::from_value(json!({
            "name": "open pits",
            "timestamp": "2024-05-01T10:00:00Z",
            "state": {},
            "storage_key": "pitsTable"
        }))
        .unwrap();
        let millis: SavedPreset = serde_json::from_value(json!({
            "name": "legacy",
            "timestamp": 1714557600000i64,
            "state": []
        }))
        .unwrap();

        assert_eq!(iso.timestamp, millis.timestamp);
        assert_eq!(iso.storage_key.as_deref(), Some("pitsTable"));
        assert!(millis.storage_key.is_none());
    }

    #[test]
    fn test_kind_paths() {
        assert_eq!(PresetKind::Filters.path(), "/api/user/filters/");
        assert_eq!(PresetKind::Columns.path(), "/api/user/columns/");
    }
}
