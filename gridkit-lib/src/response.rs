//! Cached lookups

use chrono::DateTime;
use chrono::Utc;

/// A value plus whether it came out of a session cache.
///
/// Reference-data lookups return this wrapper so callers can tell a
/// memoized answer from a fresh fetch.
///
/// # Example
///
/// ```ignore
/// let response = cache.get("kiln", &source, "/api/kilns").await?;
///
/// if response.is_cached() {
///     log::debug!("kiln options cached at {}", response.cached_at());
/// }
///
/// let options = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    pub cache: CacheStatus,
}

impl<T> Response<T> {
    /// A value fetched by this call and stored for later ones.
    pub fn cache_miss(data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Miss { cached_at },
        }
    }

    /// A value some earlier call fetched.
    pub fn cache_hit(data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Hit { cached_at },
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_hit()
    }

    /// When the value entered the cache.
    pub fn cached_at(&self) -> DateTime<Utc> {
        match self.cache {
            CacheStatus::Miss { cached_at } | CacheStatus::Hit { cached_at } => cached_at,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Whether a lookup fetched or reused its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Miss { cached_at: DateTime<Utc> },
    Hit { cached_at: DateTime<Utc> },
}

impl CacheStatus {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }
}
