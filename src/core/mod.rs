//! Core types for the seqweld library.
//!
//! This module contains the sequence handle, the element type, the
//! production-function traits and the error type everything else builds on.

pub mod element;
pub mod error;
pub mod sequence;
pub mod traits;

// Re-export core items
pub use element::Element;
pub use error::{Error, IntoError, Result};
pub use sequence::Sequence;
pub use traits::{SequenceExt, SharedSource, Source};
