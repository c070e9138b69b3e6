//! Declarative data-grid engine
//!
//! A table is described once, as a field matrix (field key to descriptor);
//! the engine derives columns, cell renderers, editors, filter parameters
//! and column panel state from it, and talks to a paginated REST backend.
//!
//! - [`compile`] - field matrix to normalized field configs
//! - [`column`] - column and cell factory
//! - [`optimistic`] - per-cell optimistic save controller
//! - [`cache`] - reference-data caches
//! - [`query`] - query parameter builder
//! - [`presets`] - saved filter and column presets
//! - [`rows`] - row selection and page fetching
//! - [`engine`] - the facade that wires everything together

pub mod api;
pub mod auth;
pub mod cache;
pub mod column;
pub mod compile;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod model;
pub mod optimistic;
pub mod presets;
pub mod query;
pub mod response;
pub mod rows;

mod client;

pub use client::*;
pub use engine::EngineBackends;
pub use engine::TableEngine;
pub use error::Error;
pub use response::CacheStatus;
pub use response::Response;
