//! Main GridClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::auth::HeaderProvider;
use crate::error::ApiError;
use crate::query::QueryParams;

/// HTTP client for the table's REST backend.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across tasks.
/// Implements [`RowBackend`](crate::api::RowBackend),
/// [`OptionSource`](crate::api::OptionSource),
/// [`PresetBackend`](crate::presets::PresetBackend) and
/// [`BeaconTransport`](crate::api::BeaconTransport).
///
/// # Example
///
/// ```ignore
/// use gridkit_lib::{GridClient, auth::StaticHeaderProvider};
///
/// let client = GridClient::builder()
///     .url("https://plant.example.com")
///     .header_provider(StaticHeaderProvider::csrf("token"))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct GridClient {
    inner: Arc<GridClientInner>,
}

struct GridClientInner {
    base_url: Url,
    header_provider: Arc<dyn HeaderProvider>,
    http_client: Client,
    timeout: Option<Duration>,
    option_page_size: usize,
}

impl std::fmt::Debug for GridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl GridClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> GridClientBuilder<Missing, Missing> {
        GridClientBuilder::new()
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Page size used when draining option sources.
    pub fn option_page_size(&self) -> usize {
        self.inner.option_page_size
    }

    /// Resolves an endpoint path such as `/api/pits` against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// `GET` with query parameters, returning the JSON body.
    pub(crate) async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value, ApiError> {
        let mut url = self.url_for(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        self.execute(Method::GET, url, None).await
    }

    /// A mutating request. Attaches the current mutation headers.
    ///
    /// Returns `Value::Null` for empty success bodies (e.g. `204 No Content`).
    pub(crate) async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        self.execute(method, url, body).await
    }

    async fn execute(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value, ApiError> {
        let mutating = method != Method::GET;
        log::debug!("{method} {url}");

        let mut request = self.inner.http_client.request(method, url);
        if mutating {
            let headers = self.inner.header_provider.mutation_headers().await;
            for (name, value) in headers.iter() {
                request = request.header(name, value);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(ApiError::from_body(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
    }

    fn map_transport(&self, error: reqwest::Error) -> ApiError {
        match (error.is_timeout(), self.inner.timeout) {
            (true, Some(timeout)) => ApiError::Timeout(timeout),
            _ => ApiError::Network(error),
        }
    }
}

/// `<endpoint>/<id>/`, the detail URL convention of the backend.
pub fn record_path(endpoint: &str, id: &str) -> String {
    format!("{}/{}/", endpoint.trim_end_matches('/'), id)
}

/// `<endpoint>/`, the collection URL used for creates.
pub fn collection_path(endpoint: &str) -> String {
    format!("{}/", endpoint.trim_end_matches('/'))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`GridClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `header_provider` - A [`HeaderProvider`] for mutating requests
pub struct GridClientBuilder<Url, Provider> {
    url: Url,
    header_provider: Provider,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    option_page_size: usize,
}

impl GridClientBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self {
            url: Missing,
            header_provider: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            option_page_size: 500,
        }
    }
}

impl Default for GridClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> GridClientBuilder<Missing, P> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> GridClientBuilder<Set<String>, P> {
        GridClientBuilder {
            url: Set(url.into()),
            header_provider: self.header_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            option_page_size: self.option_page_size,
        }
    }
}

impl<U> GridClientBuilder<U, Missing> {
    /// Sets the provider of mutation headers.
    pub fn header_provider<T: HeaderProvider + 'static>(
        self,
        provider: T,
    ) -> GridClientBuilder<U, Set<Arc<dyn HeaderProvider>>> {
        self.shared_header_provider(Arc::new(provider))
    }

    /// Sets an already shared provider of mutation headers.
    pub fn shared_header_provider(
        self,
        provider: Arc<dyn HeaderProvider>,
    ) -> GridClientBuilder<U, Set<Arc<dyn HeaderProvider>>> {
        GridClientBuilder {
            url: self.url,
            header_provider: Set(provider),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            option_page_size: self.option_page_size,
        }
    }
}

impl<U, P> GridClientBuilder<U, P> {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the page size for draining option sources. Defaults to 500.
    pub fn option_page_size(mut self, size: usize) -> Self {
        self.option_page_size = size.max(1);
        self
    }
}

impl GridClientBuilder<Set<String>, Set<Arc<dyn HeaderProvider>>> {
    /// Builds the [`GridClient`].
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<GridClient, ApiError> {
        let base_url = Url::parse(&self.url.0)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.url.0)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(GridClient {
            inner: Arc::new(GridClientInner {
                base_url,
                header_provider: self.header_provider.0,
                http_client,
                timeout: self.timeout,
                option_page_size: self.option_page_size,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticHeaderProvider;

    #[test]
    fn test_paths() {
        assert_eq!(record_path("/api/pits", "7"), "/api/pits/7/");
        assert_eq!(record_path("/api/pits/", "7"), "/api/pits/7/");
        assert_eq!(collection_path("/api/pits"), "/api/pits/");
    }

    #[test]
    fn test_build_and_resolve() {
        let client = GridClient::builder()
            .url("https://plant.example.com")
            .header_provider(StaticHeaderProvider::none())
            .build()
            .unwrap();
        assert_eq!(
            client.url_for("/api/pits/").unwrap().as_str(),
            "https://plant.example.com/api/pits/"
        );
        assert_eq!(client.option_page_size(), 500);
    }

    #[test]
    fn test_invalid_url() {
        let result = GridClient::builder()
            .url("not a url")
            .header_provider(StaticHeaderProvider::none())
            .build();
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
