//! Concurrency-aware combinators.
//!
//! These are the combinators that make real ordering and synchronization
//! decisions: prefetching on a background task, bounded fan-out, splitting
//! one sequence between two consumers, concatenation safe under concurrent
//! callers, and pairing two sequences.

pub mod buffer;
pub mod concat;
pub mod parallel;
pub mod split;
pub mod zip;

pub use buffer::buffer;
pub use concat::concat;
pub use parallel::parallel;
pub use split::split;
pub use zip::{zip, Pair};
