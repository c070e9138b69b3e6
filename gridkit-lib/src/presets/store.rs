//! PresetStore

use std::sync::Arc;
use std::sync::RwLock;

use serde_json::Value;

use super::PresetBackend;
use super::PresetKind;
use super::SavedPreset;
use crate::error::Error;

#[derive(Debug, Default)]
struct StoreState {
    storage_key: Option<String>,
    presets: Vec<SavedPreset>,
    loading: bool,
    error: Option<String>,
}

/// CRUD over the presets of one kind.
///
/// `save` and `delete` write to the backend and then reload the full list,
/// so the local list always mirrors what the backend holds.
///
/// # Example
///
/// ```ignore
/// let store = PresetStore::new(backend, PresetKind::Filters);
/// store.save("open pits", snapshot_json, "pitsTable").await?;
///
/// let presets = store.load("pitsTable").await?;
/// ```
pub struct PresetStore {
    backend: Arc<dyn PresetBackend>,
    kind: PresetKind,
    state: RwLock<StoreState>,
}

impl PresetStore {
    pub fn new(backend: Arc<dyn PresetBackend>, kind: PresetKind) -> Self {
        Self {
            backend,
            kind,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn kind(&self) -> PresetKind {
        self.kind
    }

    /// Loads the presets belonging to `storage_key`.
    ///
    /// Entries match when their stored scope key equals `storage_key`.
    /// Legacy entries without a scope key match when their normalized name
    /// contains the normalized storage key.
    pub async fn load(&self, storage_key: &str) -> Result<Vec<SavedPreset>, Error> {
        self.update(|state| {
            state.loading = true;
            state.storage_key = Some(storage_key.to_string());
        });

        match self.backend.list(self.kind).await {
            Ok(all) => {
                let presets: Vec<_> = all
                    .into_iter()
                    .filter(|preset| belongs_to(preset, storage_key))
                    .collect();
                log::debug!(
                    "loaded {} {} presets for '{storage_key}'",
                    presets.len(),
                    self.kind.as_str()
                );
                self.update(|state| {
                    state.presets = presets.clone();
                    state.loading = false;
                    state.error = None;
                });
                Ok(presets)
            }
            Err(e) => {
                log::error!("failed to load {} presets: {e}", self.kind.as_str());
                self.update(|state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Saves a preset, then reloads.
    pub async fn save(&self, name: &str, state: Value, storage_key: &str) -> Result<(), Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidOperation("preset name is empty".into()));
        }
        let preset = SavedPreset::new(name, state, storage_key);
        if let Err(e) = self.backend.save(self.kind, &preset).await {
            self.record_error(&e);
            return Err(e);
        }
        self.load(storage_key).await.map(|_| ())
    }

    /// Deletes a preset, then reloads.
    pub async fn delete(&self, name: &str, storage_key: &str) -> Result<(), Error> {
        if let Err(e) = self.backend.delete(self.kind, name, storage_key).await {
            self.record_error(&e);
            return Err(e);
        }
        self.load(storage_key).await.map(|_| ())
    }

    /// The list from the last successful load.
    pub fn presets(&self) -> Vec<SavedPreset> {
        self.read(|state| state.presets.clone())
    }

    /// Finds a loaded preset by name.
    pub fn get(&self, name: &str) -> Option<SavedPreset> {
        self.read(|state| state.presets.iter().find(|p| p.name == name).cloned())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|state| state.loading)
    }

    /// The last load, save or delete error.
    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    /// The storage key of the last load.
    pub fn storage_key(&self) -> Option<String> {
        self.read(|state| state.storage_key.clone())
    }

    fn record_error(&self, error: &Error) {
        log::error!("{} preset write failed: {error}", self.kind.as_str());
        self.update(|state| state.error = Some(error.to_string()));
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update(&self, f: impl FnOnce(&mut StoreState)) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

fn belongs_to(preset: &SavedPreset, storage_key: &str) -> bool {
    match preset.storage_key.as_deref() {
        Some(key) => key == storage_key,
        None => {
            let wanted = normalize(storage_key);
            !wanted.is_empty() && normalize(&preset.name).contains(&wanted)
        }
    }
}

/// Lowercase alphanumerics only: `"Pits-Table"` and `"pits_table"` agree.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
