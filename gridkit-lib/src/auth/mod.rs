//! Mutation headers
//!
//! Session handling lives outside the engine. The engine only needs "a
//! function that returns the current mutation headers", modelled as the
//! [`HeaderProvider`] trait.

mod headers;

pub use headers::FnHeaderProvider;
pub use headers::HeaderProvider;
pub use headers::MutationHeaders;
pub use headers::StaticHeaderProvider;
