//! Internal helpers shared by the combinators.

#[macro_use]
pub(crate) mod tracing;
