//! Options shared by the transformation combinators.

use std::fmt;
use std::sync::Arc;

use crate::core::Error;

/// What a combinator does when a caller-supplied function fails.
#[derive(Clone, Default)]
pub enum ErrorPolicy {
    /// Attach the failure to the output element (default)
    #[default]
    Propagate,
    /// Hand the failure to a callback and skip the element
    Report(Arc<dyn Fn(&Error) + Send + Sync>),
}

impl fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Propagate => write!(f, "Propagate"),
            ErrorPolicy::Report(_) => write!(f, "Report(..)"),
        }
    }
}

/// Configuration for a transformation combinator
#[derive(Debug, Clone, Default)]
pub struct SequenceConfig {
    /// Name used in log events and metric labels
    pub name: Option<String>,
    /// How caller-function failures are surfaced
    pub error_policy: ErrorPolicy,
}

impl SequenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Report caller-function failures to `callback` instead of attaching
    /// them to elements
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.error_policy = ErrorPolicy::Report(Arc::new(callback));
        self
    }

    /// Route a caller-function failure according to the policy.
    ///
    /// Returns the failure back when it should travel with the element.
    pub(crate) fn handle(&self, error: Error) -> Option<Error> {
        match &self.error_policy {
            ErrorPolicy::Propagate => Some(error),
            ErrorPolicy::Report(callback) => {
                warn!(
                    sequence = self.name.as_deref().unwrap_or("anonymous"),
                    error = %error,
                    "encountered error"
                );
                callback(&error);
                None
            }
        }
    }
}
