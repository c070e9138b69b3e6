//! Reference-data caches
//!
//! Both caches live as long as the table engine that owns them. Entries are
//! fetched once per key and shared by every cell; concurrent first requests
//! for a key share one fetch, and a failed fetch is not cached.
//!
//! - [`ScopedOptionsCache`] - foreign-key options, keyed by field key
//! - [`TagSuggestionCache`] - tag suggestions, keyed by `(scope id, model)`

mod scoped;
mod tags;

pub use scoped::*;
pub use tags::*;
