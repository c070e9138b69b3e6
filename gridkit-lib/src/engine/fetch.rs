//! Table state, page fetching and reference data

use std::sync::Arc;

use futures::future::join_all;

use super::TableEngine;
use crate::cache::OptionList;
use crate::column::raw_id;
use crate::compile::FieldKind;
use crate::error::Error;
use crate::model::ColumnFilter;
use crate::model::FilterState;
use crate::model::RowId;
use crate::model::Sort;
use crate::query::Pagination;
use crate::query::QueryParams;
use crate::query::build_query_params;
use crate::rows::FetchOutcome;

impl TableEngine {
    // =========================================================================
    // Table state
    // =========================================================================

    pub fn pagination(&self) -> Pagination {
        self.read_view(|view| view.pagination)
    }

    /// Number of pages for the current count and page size.
    pub fn page_count(&self) -> usize {
        self.pagination().page_count(self.rows.count())
    }

    pub fn sorting(&self) -> Option<Sort> {
        self.read_view(|view| view.sorting.clone())
    }

    pub fn filters(&self) -> FilterState {
        self.read_view(|view| view.filters.clone())
    }

    pub fn global_filter(&self) -> String {
        self.read_view(|view| view.global_filter.clone())
    }

    /// The list request parameters for the current table state.
    pub fn query_params(&self) -> QueryParams {
        self.read_view(|view| {
            build_query_params(
                &view.pagination,
                view.sorting.as_ref(),
                &view.global_filter,
                &view.filters,
                &self.meta,
            )
        })
    }

    /// Fetches the page for the current table state.
    ///
    /// Idle edit controllers are dropped once a page is applied, so cells
    /// pick up the fresh values.
    pub async fn refresh(&self) -> Result<FetchOutcome, Error> {
        let params = self.query_params();
        let outcome = self
            .rows
            .fetch(self.backends.rows.as_ref(), &self.config.endpoint, &params)
            .await?;
        if let FetchOutcome::Applied { count } = outcome {
            log::debug!("loaded page of '{}' ({count} rows total)", self.config.storage_key);
            self.controllers.retain_saving();
        }
        Ok(outcome)
    }

    /// Moves to a 0-based page.
    pub async fn set_page(&self, page_index: usize) -> Result<FetchOutcome, Error> {
        self.update_view(|view| view.pagination.page_index = page_index);
        self.refresh().await
    }

    /// Changes the page size and goes back to the first page.
    pub async fn set_page_size(&self, page_size: usize) -> Result<FetchOutcome, Error> {
        if page_size == 0 {
            return Err(Error::InvalidOperation("page size must be positive".into()));
        }
        self.update_view(|view| view.pagination = Pagination::new(0, page_size));
        self.refresh().await
    }

    pub async fn set_sort(&self, sort: Option<Sort>) -> Result<FetchOutcome, Error> {
        if let Some(sort) = &sort {
            self.require_field(&sort.field)?;
        }
        self.update_view(|view| view.sorting = sort);
        self.refresh().await
    }

    /// Sets (or, with an empty value, removes) one column filter and goes
    /// back to the first page.
    pub async fn set_filter(&self, filter: ColumnFilter) -> Result<FetchOutcome, Error> {
        self.require_field(&filter.field_key)?;
        self.update_view(|view| {
            view.filters.set(filter);
            view.pagination.page_index = 0;
        });
        self.refresh().await
    }

    pub async fn clear_filter(&self, field_key: &str) -> Result<FetchOutcome, Error> {
        self.update_view(|view| {
            view.filters.remove(field_key);
            view.pagination.page_index = 0;
        });
        self.refresh().await
    }

    pub async fn clear_filters(&self) -> Result<FetchOutcome, Error> {
        self.update_view(|view| {
            view.filters.clear();
            view.global_filter.clear();
            view.pagination.page_index = 0;
        });
        self.refresh().await
    }

    /// Sets the free-text search and goes back to the first page.
    pub async fn set_global_filter(&self, term: &str) -> Result<FetchOutcome, Error> {
        self.update_view(|view| {
            view.global_filter = term.to_string();
            view.pagination.page_index = 0;
        });
        self.refresh().await
    }

    /// Debounced [`set_global_filter`](Self::set_global_filter) for keystrokes.
    ///
    /// Every call cancels the pending search; only the last term of a burst
    /// is fetched.
    pub fn search_debounced(self: &Arc<Self>, term: impl Into<String>) {
        let engine = Arc::clone(self);
        let term = term.into();
        self.debouncer.schedule(self.settings.search_debounce, async move {
            if let Err(e) = engine.set_global_filter(&term).await {
                log::error!("search for '{term}' failed: {e}");
            }
        });
    }

    /// Drops a pending debounced search.
    pub fn cancel_search(&self) {
        self.debouncer.cancel();
    }

    fn require_field(&self, key: &str) -> Result<(), Error> {
        match self.matrix.field(key) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownField(key.to_string())),
        }
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    /// Loads every foreign-key option list.
    ///
    /// Unscoped lists (and the ownership field) are preloaded into the
    /// global option map; scoped lists go through the scoped cache. All
    /// lists load concurrently. Every list is attempted; the first failure
    /// is returned.
    pub async fn load_reference_data(&self) -> Result<(), Error> {
        let ownership = self.config.ownership_field.as_deref();
        let lists: Vec<_> = self
            .matrix
            .field_configs
            .iter()
            .filter_map(|config| match &config.kind {
                FieldKind::ForeignKey(fk) => fk.endpoint.as_deref().map(|endpoint| {
                    let key = config.key.as_str();
                    (key, endpoint, fk.scoped && ownership != Some(key))
                }),
                _ => None,
            })
            .collect();

        let results = join_all(lists.into_iter().map(|(key, endpoint, scoped)| async move {
            let result: Result<(), Error> = if scoped {
                self.scoped_cache
                    .get(key, self.backends.options.as_ref(), endpoint)
                    .await
                    .map(|_| ())
            } else {
                match self.backends.options.fetch_options(endpoint).await {
                    Ok(options) => {
                        let options: OptionList = Arc::new(options);
                        self.update_options(|map| {
                            map.insert(key.to_string(), options);
                        });
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("loading options for '{key}' failed: {e}");
                        Err(e)
                    }
                }
            };
            result
        }))
        .await;

        results.into_iter().collect()
    }

    /// Reports the current ambient scope (e.g. the selected factory).
    ///
    /// When it differs from the last one, scoped option lists are dropped
    /// and reloaded. Returns `true` if they were.
    pub async fn scope_changed(&self, scope_key: &str) -> Result<bool, Error> {
        if !self.scoped_cache.invalidate(scope_key) {
            return Ok(false);
        }
        self.load_reference_data().await?;
        Ok(true)
    }

    /// Loads the tag suggestions for one tag cell.
    pub async fn load_tag_suggestions(&self, id: &RowId, key: &str) -> Result<Vec<String>, Error> {
        let config = self
            .matrix
            .field(key)
            .ok_or_else(|| Error::UnknownField(key.to_string()))?;
        let FieldKind::Tag(tag) = &config.kind else {
            return Err(Error::InvalidOperation(format!("'{key}' is not a tag field")));
        };
        let (Some(endpoint), Some(model)) = (tag.endpoint.as_deref(), tag.model_name.as_deref()) else {
            return Ok(tag.suggestions.clone());
        };

        let row = self.require_row(id)?;
        let scope = self
            .config
            .ownership_field
            .as_deref()
            .and_then(|field| row.get(field))
            .and_then(raw_id)
            .unwrap_or_default();

        self.tag_cache
            .get(&scope, model, self.backends.options.as_ref(), endpoint)
            .await
    }

    /// Records a tag created in the tag editor so it is suggested next time.
    pub fn add_tag_suggestion(&self, id: &RowId, key: &str, tag: &str) -> bool {
        let Some(FieldKind::Tag(field)) = self.matrix.field(key).map(|c| &c.kind) else {
            return false;
        };
        let Some(model) = field.model_name.as_deref() else {
            return false;
        };
        let scope = self
            .rows
            .row(id)
            .zip(self.config.ownership_field.as_deref())
            .and_then(|(row, field)| row.get(field).and_then(raw_id))
            .unwrap_or_default();
        self.tag_cache.add(&scope, model, tag)
    }
}
