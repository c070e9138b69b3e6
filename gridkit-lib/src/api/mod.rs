//! REST operations
//!
//! The engine talks to its backend through three narrow traits so tests
//! and offline tools can swap in other implementations:
//!
//! - [`RowBackend`] - list, create, patch and delete rows
//! - [`OptionSource`] - foreign-key options and tag suggestions
//! - [`BeaconTransport`] - fire-and-forget usage events
//!
//! [`GridClient`](crate::GridClient) implements all of them against the
//! REST conventions:
//!
//! ```text
//! GET    <endpoint>?page=&page_size=&ordering=&...   list
//! POST   <endpoint>/                                 create
//! PATCH  <endpoint>/<id>/                            update
//! DELETE <endpoint>/<id>/                            delete
//! ```

mod beacon;
mod options;
mod presets;
mod rows;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;

pub use beacon::Beacon;
pub use options::option_pages;

use crate::error::Error;
use crate::model::Row;
use crate::model::RowId;
use crate::model::ScopedOption;
use crate::query::PageResponse;
use crate::query::QueryParams;

/// Row CRUD against a list endpoint.
#[async_trait]
pub trait RowBackend: Send + Sync {
    /// Fetches one page.
    async fn list(&self, endpoint: &str, params: &QueryParams) -> Result<PageResponse, Error>;

    /// Creates a record and returns it as stored.
    async fn create(&self, endpoint: &str, fields: &Map<String, Value>) -> Result<Row, Error>;

    /// Patches a record.
    ///
    /// Returns the full updated record when the backend sends one.
    async fn patch(
        &self,
        endpoint: &str,
        id: &RowId,
        fields: &Map<String, Value>,
    ) -> Result<Option<Row>, Error>;

    async fn delete(&self, endpoint: &str, id: &RowId) -> Result<(), Error>;
}

/// Reference data for foreign-key and tag cells.
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Every option of an option endpoint, all pages consumed.
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<ScopedOption>, Error>;

    /// Tag suggestions for a model within a scope.
    async fn fetch_tag_suggestions(
        &self,
        endpoint: &str,
        scope_id: &str,
        model_name: &str,
    ) -> Result<Vec<String>, Error>;
}

/// Sends usage events.
#[async_trait]
pub trait BeaconTransport: Send + Sync {
    async fn send_beacon(&self, path: &str, event: &Value) -> Result<(), Error>;
}
