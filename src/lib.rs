//! # Lazily-evaluated, concurrency-aware pull sequences
//!
//! This crate provides a pull-based sequence abstraction and a set of
//! combinators that stay correct when many tasks pull from the same
//! sequence at once.
//!
//! ## Core Concepts
//!
//! - **Sequence**: a cloneable handle around a production function; each
//!   `next` yields one element, or `None` once the sequence has ended
//! - **Element**: a value, a failure, or both; a failure never ends the
//!   sequence on its own
//! - **Source**: a production function, driven one call at a time
//! - **Combinators**: prefetching (`buffer`), bounded fan-out (`parallel`),
//!   two-way split (`split`), concatenation (`concat`) and pairing (`zip`)
//!
//! ## Example
//!
//! ```rust
//! use seqweld::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let squares = from_iter(1..=100)
//!         .map(|x: u64| Ok(x * x))
//!         .buffer(16);
//!
//!     let total = reduce(squares, 0u64, |acc, x| Ok(acc + x)).await?;
//!     assert_eq!(total, 338_350);
//!     Ok(())
//! }
//! ```

#[macro_use]
mod util;

pub mod combinators;
pub mod config;
pub mod core;
pub mod metrics;
pub mod processors;
pub mod sinks;
pub mod sources;

// Re-export commonly used items
pub mod prelude {
    pub use crate::combinators::{buffer, concat, parallel, split, zip, Pair};
    pub use crate::config::{ErrorPolicy, SequenceConfig};
    pub use crate::core::{Element, Error, Result, Sequence, SequenceExt, SharedSource, Source};
    pub use crate::sinks::{coalesce, collect, count, for_each, reduce};
    pub use crate::sources::{empty, from_channel, from_fn, from_iter, from_stream, once, repeat};
}

// Re-export main types
pub use crate::core::{Element, Error, Result, Sequence};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
