//! Scoped foreign-key option cache

use std::sync::Arc;
use std::sync::Mutex;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::api::OptionSource;
use crate::error::Error;
use crate::model::ScopedOption;
use crate::response::Response;

/// Shared list of options for one field.
pub type OptionList = Arc<Vec<ScopedOption>>;

#[derive(Debug)]
struct CachedOptions {
    options: OptionList,
    cached_at: DateTime<Utc>,
}

/// Memoized option lists for scoped foreign-key fields.
///
/// Keyed by field key alone. The backend narrows options to the ambient
/// scope (e.g. the active factory), so the scope value is not part of the
/// key: after the scope changes the caller must call
/// [`invalidate`](Self::invalidate), otherwise lists from the previous
/// scope keep being served.
///
/// # Example
///
/// ```ignore
/// let cache = ScopedOptionsCache::new();
///
/// let first = cache.get("kiln", &client, "/api/kilns/").await?;
/// assert!(!first.is_cached());
///
/// let second = cache.get("kiln", &client, "/api/kilns/").await?;
/// assert!(second.is_cached());
///
/// // the user switched factories
/// cache.invalidate("factory-2");
/// ```
#[derive(Debug, Default)]
pub struct ScopedOptionsCache {
    entries: DashMap<String, Arc<OnceCell<CachedOptions>>>,
    scope: Mutex<Option<String>>,
}

impl ScopedOptionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the options for `field_key`, fetching them from `endpoint` on
    /// first use.
    pub async fn get(
        &self,
        field_key: &str,
        source: &dyn OptionSource,
        endpoint: &str,
    ) -> Result<Response<OptionList>, Error> {
        let cell = self.entries.entry(field_key.to_string()).or_default().clone();

        let mut fetched = false;
        let entry = cell
            .get_or_try_init(|| {
                fetched = true;
                async move {
                    log::debug!("fetching options for '{field_key}' from {endpoint}");
                    let options = source.fetch_options(endpoint).await?;
                    Ok::<_, Error>(CachedOptions {
                        options: Arc::new(options),
                        cached_at: Utc::now(),
                    })
                }
            })
            .await
            .inspect_err(|e| log::error!("loading options for '{field_key}' failed: {e}"))?;

        let options = entry.options.clone();
        Ok(if fetched {
            Response::cache_miss(options, entry.cached_at)
        } else {
            Response::cache_hit(options, entry.cached_at)
        })
    }

    /// Returns the cached options without fetching.
    pub fn peek(&self, field_key: &str) -> Option<OptionList> {
        let cell = self.entries.get(field_key)?;
        cell.get().map(|entry| entry.options.clone())
    }

    /// Stores options fetched elsewhere, replacing any cached list.
    pub fn insert(&self, field_key: &str, options: Vec<ScopedOption>) {
        let cell = OnceCell::new_with(Some(CachedOptions {
            options: Arc::new(options),
            cached_at: Utc::now(),
        }));
        self.entries.insert(field_key.to_string(), Arc::new(cell));
    }

    /// Records the current scope.
    ///
    /// If it differs from the last scope seen, every entry is dropped.
    /// Returns `true` if entries were dropped.
    pub fn invalidate(&self, scope_key: &str) -> bool {
        let mut scope = self.scope.lock().unwrap_or_else(|e| e.into_inner());
        if scope.as_deref() == Some(scope_key) {
            return false;
        }
        log::debug!("scope changed from {:?} to '{scope_key}'", *scope);
        *scope = Some(scope_key.to_string());

        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }

    /// The scope of the last [`invalidate`](Self::invalidate) call.
    pub fn scope(&self) -> Option<String> {
        self.scope.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drops every entry regardless of scope.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of fields with a cached (or in-flight) list.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
