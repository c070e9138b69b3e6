//! Query parameter building
//!
//! [`build_query_params`] translates in-memory pagination, sort, global
//! search and column filters into the backend's query-string conventions.
//! [`PageResponse`] normalizes what the list endpoint answers.

mod builder;
mod page;
mod params;

pub use builder::*;
pub use page::*;
pub use params::*;
