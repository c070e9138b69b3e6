//! HeaderProvider trait and MutationHeaders

use async_trait::async_trait;

/// Name of the CSRF header sent with every mutating request.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Extra headers attached to POST, PATCH and DELETE requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationHeaders {
    headers: Vec<(String, String)>,
}

impl MutationHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers carrying only a CSRF token.
    pub fn csrf(token: impl Into<String>) -> Self {
        Self::new().with(CSRF_HEADER, token)
    }

    /// Adds a header (builder pattern). A later header with the same name wins.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Supplies the headers every mutating request must carry.
///
/// The client asks for headers right before each POST, PATCH or DELETE, so
/// implementations can hand out a token that rotates during a session.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use gridkit_lib::auth::{HeaderProvider, MutationHeaders};
///
/// struct CookieJarHeaders;
///
/// #[async_trait]
/// impl HeaderProvider for CookieJarHeaders {
///     async fn mutation_headers(&self) -> MutationHeaders {
///         MutationHeaders::csrf("token-from-cookie")
///     }
/// }
/// ```
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    async fn mutation_headers(&self) -> MutationHeaders;
}

/// Always returns the same headers.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaderProvider {
    headers: MutationHeaders,
}

impl StaticHeaderProvider {
    pub fn new(headers: MutationHeaders) -> Self {
        Self { headers }
    }

    /// A provider with a fixed CSRF token.
    pub fn csrf(token: impl Into<String>) -> Self {
        Self::new(MutationHeaders::csrf(token))
    }

    /// A provider that adds nothing.
    pub fn none() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HeaderProvider for StaticHeaderProvider {
    async fn mutation_headers(&self) -> MutationHeaders {
        self.headers.clone()
    }
}

/// Wraps a closure, e.g. one that reads the current token from a cookie store.
pub struct FnHeaderProvider<F>(F);

impl<F> FnHeaderProvider<F>
where
    F: Fn() -> MutationHeaders + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> HeaderProvider for FnHeaderProvider<F>
where
    F: Fn() -> MutationHeaders + Send + Sync,
{
    async fn mutation_headers(&self) -> MutationHeaders {
        (self.0)()
    }
}
