//! Row selection and data-fetch controller
//!
//! [`RowStore`] holds the current page and applies fetch results, guarded
//! by a request generation so a slow, stale response can never overwrite a
//! newer one. [`RowSelection`] tracks selected row ids across pages.

mod selection;
mod store;

pub use selection::*;
pub use store::*;
