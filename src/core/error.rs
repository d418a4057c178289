//! Error types for sequences and their combinators.
//!
//! Failures travel attached to the element they belong to; nothing here is
//! fatal to a sequence on its own.

use std::sync::Arc;
use thiserror::Error as ThisError;

/// The main error type carried by sequence elements.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// The production function failed to produce a specific element
    #[error("production error: {0}")]
    Production(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// A caller-supplied mapper, predicate or reducer failed
    #[error("function error: {0}")]
    Function(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// Several failures occurred on the same step (e.g. both sides of a zip)
    #[error("{}", display_joined(.0))]
    Joined(Vec<Error>),

    /// A background production task ended abnormally
    #[error("background task failed: {0}")]
    Shutdown(String),

    /// A custom error with a message
    #[error("{0}")]
    Custom(String),
}

fn display_joined(errors: &[Error]) -> String {
    let parts: Vec<String> = errors.iter().map(|e| format!("[{}]", e)).collect();
    format!("multiple errors occurred: {}", parts.join(", "))
}

// Convenience constructors
impl Error {
    /// Create a production error from any error type
    pub fn production<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Error::Production(Arc::new(error))
    }

    /// Create a caller-function error from any error type
    pub fn function<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Error::Function(Arc::new(error))
    }

    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(message: S) -> Self {
        Error::Custom(message.into())
    }

    /// Join two optional failures into at most one.
    ///
    /// Both sides are preserved when both failed; nested joins are flattened.
    pub fn join(left: Option<Error>, right: Option<Error>) -> Option<Error> {
        match (left, right) {
            (None, None) => None,
            (Some(e), None) | (None, Some(e)) => Some(e),
            (Some(l), Some(r)) => {
                let mut errors = Vec::with_capacity(2);
                for e in [l, r] {
                    match e {
                        Error::Joined(inner) => errors.extend(inner),
                        other => errors.push(other),
                    }
                }
                Some(Error::Joined(errors))
            }
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Shutdown(e.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Production(Arc::from(e))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Custom(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Custom(s.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Helper trait for converting foreign errors into our Error type
pub trait IntoError<T> {
    fn into_production_error(self) -> Result<T>;
    fn into_function_error(self) -> Result<T>;
}

impl<T, E> IntoError<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_production_error(self) -> Result<T> {
        self.map_err(Error::production)
    }

    fn into_function_error(self) -> Result<T> {
        self.map_err(Error::function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_both_sides() {
        let joined = Error::join(Some(Error::custom("left")), Some(Error::custom("right")));
        match joined {
            Some(Error::Joined(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].to_string(), "left");
                assert_eq!(errors[1].to_string(), "right");
            }
            other => panic!("expected joined error, got {:?}", other),
        }
    }

    #[test]
    fn test_join_single_side_passes_through() {
        let joined = Error::join(None, Some(Error::custom("right")));
        assert_eq!(joined.unwrap().to_string(), "right");
        assert!(Error::join(None, None).is_none());
    }

    #[test]
    fn test_join_flattens_nested() {
        let inner = Error::join(Some("a".into()), Some("b".into()));
        let joined = Error::join(inner, Some("c".into())).unwrap();
        assert_eq!(
            joined.to_string(),
            "multiple errors occurred: [a], [b], [c]"
        );
    }

    #[test]
    fn test_into_function_error() {
        let parsed: std::result::Result<i32, _> = "x".parse::<i32>();
        let err = parsed.into_function_error().unwrap_err();
        assert!(matches!(err, Error::Function(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
