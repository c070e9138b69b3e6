//! SQLite-backed preset storage

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;

use super::PresetBackend;
use super::PresetKind;
use super::SavedPreset;
use crate::error::Error;

/// Presets stored in a local SQLite file.
///
/// Same contract as the remote store; used when no backend is reachable.
///
/// # Example
///
/// ```ignore
/// use gridkit_lib::presets::SqlitePresetBackend;
///
/// let backend = SqlitePresetBackend::open("presets.db").await?;
/// ```
pub struct SqlitePresetBackend {
    client: Client,
}

impl SqlitePresetBackend {
    /// Opens (and if needed creates) the preset database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory database. Data is lost on drop.
    pub async fn open_in_memory() -> Result<Self, async_sqlite::Error> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS presets (
                        kind TEXT NOT NULL,
                        storage_key TEXT NOT NULL,
                        name TEXT NOT NULL,
                        timestamp INTEGER NOT NULL,
                        state TEXT NOT NULL,
                        PRIMARY KEY (kind, storage_key, name)
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl PresetBackend for SqlitePresetBackend {
    async fn list(&self, kind: PresetKind) -> Result<Vec<SavedPreset>, Error> {
        let kind = kind.as_str();
        let rows = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT name, storage_key, timestamp, state FROM presets
                     WHERE kind = ? ORDER BY timestamp, name",
                )?;
                let rows = stmt.query_map([kind], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        rows.into_iter()
            .map(|(name, storage_key, millis, state)| {
                Ok(SavedPreset {
                    name,
                    timestamp: Utc
                        .timestamp_millis_opt(millis)
                        .single()
                        .unwrap_or_default(),
                    state: serde_json::from_str(&state)?,
                    storage_key: Some(storage_key),
                })
            })
            .collect()
    }

    async fn save(&self, kind: PresetKind, preset: &SavedPreset) -> Result<(), Error> {
        let kind = kind.as_str();
        let name = preset.name.clone();
        let storage_key = preset.storage_key.clone().unwrap_or_default();
        let timestamp = preset.timestamp.timestamp_millis();
        let state = serde_json::to_string(&preset.state)?;

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO presets (kind, storage_key, name, timestamp, state)
                     VALUES (?, ?, ?, ?, ?)
                     ON CONFLICT(kind, storage_key, name)
                     DO UPDATE SET timestamp = excluded.timestamp, state = excluded.state",
                    rusqlite::params![kind, storage_key, name, timestamp, state],
                )
            })
            .await?;

        Ok(())
    }

    async fn delete(&self, kind: PresetKind, name: &str, storage_key: &str) -> Result<(), Error> {
        let kind = kind.as_str();
        let name = name.to_string();
        let storage_key = storage_key.to_string();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "DELETE FROM presets WHERE kind = ? AND storage_key = ? AND name = ?",
                    rusqlite::params![kind, storage_key, name],
                )
            })
            .await?;

        Ok(())
    }
}
