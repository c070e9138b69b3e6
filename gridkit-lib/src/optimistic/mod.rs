//! Optimistic per-cell edit controller
//!
//! One [`OptimisticField`] per `(record id, field key)`. A save applies the
//! new value locally first, sends one PATCH, and then either reconciles the
//! whole record from the response or reverts to the previous value.
//!
//! ```text
//! Idle --save--> Saving --ok--> Idle (committed, record reconciled)
//!                       --err-> Idle (reverted, error reported)
//! ```
//!
//! A save issued while the field is `Saving` is rejected, not queued.

mod callbacks;
mod field;
mod payload;
mod registry;

pub use callbacks::*;
pub use field::*;
pub use payload::*;
pub use registry::*;
