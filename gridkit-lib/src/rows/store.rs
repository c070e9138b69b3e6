//! RowStore

use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Map;
use serde_json::Value;

use crate::api::RowBackend;
use crate::config::FetchOrdering;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Row;
use crate::model::RowId;
use crate::query::PageResponse;
use crate::query::QueryParams;

/// Issued by [`RowStore::begin_fetch`]; identifies one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What happened to a finished fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page replaced the current rows.
    Applied { count: usize },
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

#[derive(Debug, Default)]
struct PageState {
    rows: Vec<Row>,
    count: usize,
    loading: bool,
    error: Option<String>,
}

/// The current page of rows.
///
/// Every request takes a ticket from a monotonically increasing generation.
/// With [`FetchOrdering::LastRequestWins`] only the response to the newest
/// ticket is applied, whatever order responses arrive in.
///
/// # Example
///
/// ```ignore
/// let store = RowStore::new(FetchOrdering::LastRequestWins);
/// let outcome = store.fetch(backend.as_ref(), "/api/pits", &params).await?;
///
/// println!("{} of {} rows", store.rows().len(), store.count());
/// ```
#[derive(Debug)]
pub struct RowStore {
    ordering: FetchOrdering,
    timeout: Option<Duration>,
    generation: AtomicU64,
    state: RwLock<PageState>,
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new(FetchOrdering::default())
    }
}

impl RowStore {
    pub fn new(ordering: FetchOrdering) -> Self {
        Self {
            ordering,
            timeout: None,
            generation: AtomicU64::new(0),
            state: RwLock::new(PageState::default()),
        }
    }

    /// Fails page loads that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Starts a request: bumps the generation and marks the store loading.
    pub fn begin_fetch(&self) -> FetchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|state| state.loading = true);
        FetchTicket(generation)
    }

    /// Returns `true` if `ticket` belongs to the newest request.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Applies the result of the request identified by `ticket`.
    ///
    /// A stale failure is dropped like a stale success. A current failure
    /// keeps the previous rows and records the error.
    pub fn finish_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<PageResponse, Error>,
    ) -> Result<FetchOutcome, Error> {
        let current = self.is_current(ticket);
        if !current && self.ordering == FetchOrdering::LastRequestWins {
            log::debug!("dropping stale page response (generation {})", ticket.0);
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let count = page.count;
                self.update(|state| {
                    state.rows = page.results;
                    state.count = page.count;
                    state.error = None;
                    if current {
                        state.loading = false;
                    }
                });
                Ok(FetchOutcome::Applied { count })
            }
            Err(e) => {
                log::error!("page fetch failed: {e}");
                self.update(|state| {
                    state.error = Some(e.to_string());
                    if current {
                        state.loading = false;
                    }
                });
                Err(e)
            }
        }
    }

    /// Lists one page through `backend` and applies it.
    pub async fn fetch(
        &self,
        backend: &dyn RowBackend,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<FetchOutcome, Error> {
        let ticket = self.begin_fetch();
        let request = backend.list(endpoint, params);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or_else(|_| Err(ApiError::Timeout(limit).into())),
            None => request.await,
        };
        self.finish_fetch(ticket, result)
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    /// Prepends a created record and bumps the total.
    pub fn add_record(&self, row: Row) {
        self.update(|state| {
            state.rows.insert(0, row);
            state.count += 1;
        });
    }

    /// Sets one field of a loaded record. Returns `false` if it is not loaded.
    pub fn set_field(&self, id: &RowId, field: &str, value: Value) -> bool {
        self.with_row(id, |row| row.insert(field, value))
    }

    /// Merges `fields` into a loaded record.
    pub fn update_record(&self, id: &RowId, fields: &Map<String, Value>) -> bool {
        self.with_row(id, |row| {
            for (key, value) in fields {
                row.insert(key.clone(), value.clone());
            }
        })
    }

    /// Merges a full server record into the loaded record with the same id.
    pub fn update_full_record(&self, record: &Row) -> bool {
        let Some(id) = record.id() else {
            return false;
        };
        self.with_row(&id, |row| row.merge(record))
    }

    /// Removes records and lowers the total. Returns how many were loaded.
    pub fn delete_records(&self, ids: &[RowId]) -> usize {
        let mut removed = 0;
        self.update(|state| {
            let before = state.rows.len();
            state
                .rows
                .retain(|row| row.id().is_none_or(|id| !ids.contains(&id)));
            removed = before - state.rows.len();
            state.count = state.count.saturating_sub(removed);
        });
        removed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn rows(&self) -> Vec<Row> {
        self.read(|state| state.rows.clone())
    }

    pub fn row(&self, id: &RowId) -> Option<Row> {
        self.read(|state| {
            state
                .rows
                .iter()
                .find(|row| row.id().as_ref() == Some(id))
                .cloned()
        })
    }

    /// Total row count reported by the backend.
    pub fn count(&self) -> usize {
        self.read(|state| state.count)
    }

    /// Ids of the loaded rows, in page order.
    pub fn page_ids(&self) -> Vec<RowId> {
        self.read(|state| state.rows.iter().filter_map(Row::id).collect())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|state| state.loading)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    fn with_row(&self, id: &RowId, f: impl FnOnce(&mut Row)) -> bool {
        let mut found = false;
        self.update(|state| {
            if let Some(row) = state.rows.iter_mut().find(|row| row.id().as_ref() == Some(id)) {
                f(row);
                found = true;
            }
        });
        found
    }

    fn read<T>(&self, f: impl FnOnce(&PageState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update(&self, f: impl FnOnce(&mut PageState)) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}
