//! Typed models

mod field;
mod filter;
mod option;
mod row;
mod table;

pub use field::*;
pub use filter::*;
pub use option::*;
pub use row::*;
pub use table::*;
