//! The unit produced by a sequence.

use crate::core::error::{Error, Result};

/// One produced element: a value, a failure, or a value paired with a failure.
///
/// A sequence reports exhaustion by returning `None` instead of an element,
/// so an `Element` always means "produced". Producing a failure does not end
/// the sequence; the caller decides whether to keep pulling.
#[derive(Debug, Clone)]
pub struct Element<T> {
    value: Option<T>,
    failure: Option<Error>,
}

impl<T> Element<T> {
    /// A successfully produced value
    pub fn value(value: T) -> Self {
        Self {
            value: Some(value),
            failure: None,
        }
    }

    /// A failure with no usable value
    pub fn failure(error: Error) -> Self {
        Self {
            value: None,
            failure: Some(error),
        }
    }

    /// A value that was produced alongside a failure
    pub fn with_failure(value: T, error: Error) -> Self {
        Self {
            value: Some(value),
            failure: Some(error),
        }
    }

    /// Build an element from its raw parts.
    ///
    /// Returns `None` when neither a value nor a failure is present.
    pub fn from_parts(value: Option<T>, failure: Option<Error>) -> Option<Self> {
        if value.is_none() && failure.is_none() {
            return None;
        }
        Some(Self { value, failure })
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Split the element into its value and failure.
    pub fn into_parts(self) -> (Option<T>, Option<Error>) {
        (self.value, self.failure)
    }

    /// Consume the element, preferring the failure over the value.
    pub fn into_result(self) -> Result<T> {
        match (self.value, self.failure) {
            (_, Some(e)) => Err(e),
            (Some(v), None) => Ok(v),
            // unreachable through the public constructors
            (None, None) => Err(Error::custom("element carries neither value nor failure")),
        }
    }

    /// Transform the value, keeping any attached failure.
    pub fn map<U, F>(self, f: F) -> Element<U>
    where
        F: FnOnce(T) -> U,
    {
        Element {
            value: self.value.map(f),
            failure: self.failure,
        }
    }
}

impl<T> From<Result<T>> for Element<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(v) => Element::value(v),
            Err(e) => Element::failure(e),
        }
    }
}

impl<T: PartialEq> PartialEq<T> for Element<T> {
    fn eq(&self, other: &T) -> bool {
        self.failure.is_none() && self.value.as_ref() == Some(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_element() {
        let e = Element::value(7);
        assert!(e.is_ok());
        assert_eq!(e.get(), Some(&7));
        assert_eq!(e, 7);
        assert_eq!(e.into_result().unwrap(), 7);
    }

    #[test]
    fn test_failure_wins_in_result() {
        let e = Element::with_failure(3, Error::custom("bad"));
        assert!(e.is_failed());
        assert_eq!(e.get(), Some(&3));
        assert_eq!(e.into_result().unwrap_err().to_string(), "bad");
    }

    #[test]
    fn test_from_parts_rejects_empty() {
        assert!(Element::<i32>::from_parts(None, None).is_none());
        let e = Element::<i32>::from_parts(None, Some("x".into())).unwrap();
        assert!(e.get().is_none());
    }

    #[test]
    fn test_map_keeps_failure() {
        let e = Element::with_failure(2, Error::custom("kept")).map(|v| v * 10);
        let (value, failure) = e.into_parts();
        assert_eq!(value, Some(20));
        assert_eq!(failure.unwrap().to_string(), "kept");
    }
}
