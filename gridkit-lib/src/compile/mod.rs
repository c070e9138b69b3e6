//! Field matrix compiler.
//!
//! Turns one [`FieldDescriptorMap`](crate::model::FieldDescriptorMap) into
//! the derived structures the rest of the engine consumes:
//!
//! - [`to_field_configs`] - ordered, normalized [`FieldConfig`]s
//! - [`to_column_visibility`] - column panel membership and default visibility
//! - [`to_column_order`] - bare key order
//! - [`to_filter_membership`] - filter panel membership
//!
//! All four share one ordering: `(order ?? 999, key)` ascending.

mod config;
mod matrix;

pub use config::*;
pub use matrix::*;
