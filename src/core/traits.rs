//! Core traits for production functions.
//!
//! A [`Sequence`](crate::core::Sequence) is a handle around a production
//! function. Plain production functions implement [`Source`] and are driven
//! one call at a time; combinators that coordinate concurrent callers
//! themselves implement [`SharedSource`].

use async_trait::async_trait;
use std::future::Future;

use crate::combinators::Pair;
use crate::core::element::Element;
use crate::core::error::Result;
use crate::core::sequence::Sequence;

/// A production function that yields one element per call.
///
/// Sources are pull-based: they only produce when asked. Calls are
/// serialized by the owning sequence, so implementations never see two
/// overlapping `produce` calls.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use seqweld::core::{Element, Source};
///
/// struct Counter {
///     current: u64,
///     max: u64,
/// }
///
/// #[async_trait]
/// impl Source for Counter {
///     type Item = u64;
///
///     async fn produce(&mut self) -> Option<Element<Self::Item>> {
///         if self.current < self.max {
///             self.current += 1;
///             Some(Element::value(self.current))
///         } else {
///             None // exhausted
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + 'static {
    /// The type of items this source generates
    type Item: Send + 'static;

    /// Produce the next element, or `None` once the source is exhausted.
    ///
    /// After returning `None` once, further calls must keep returning `None`.
    async fn produce(&mut self) -> Option<Element<Self::Item>>;

    /// Release any resources held by the source.
    ///
    /// Called at most once, when the owning sequence is stopped.
    async fn teardown(&mut self) {}
}

/// A production function that synchronizes its own callers.
///
/// `produce` may be invoked by several tasks at once. Implementations must
/// deliver each logical element to exactly one caller.
#[async_trait]
pub trait SharedSource: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn produce(&self) -> Option<Element<Self::Item>>;

    /// Ask pending and future `produce` calls to wind down.
    ///
    /// Called by `stop` before it waits for in-flight `next` calls, so it
    /// must not block. Calls parked waiting for output should return soon
    /// after.
    fn cancel(&self) {}

    async fn teardown(&self) {}

    /// Whether `produce` may still be called after `teardown` to hand out
    /// elements that were already produced before the stop.
    fn drains_after_stop(&self) -> bool {
        false
    }
}

/// Extension trait offering the combinators as methods.
///
/// ```rust
/// use seqweld::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> seqweld::Result<()> {
/// let evens = from_iter(1..=10)
///     .filter(|x| Ok(x % 2 == 0))
///     .map(|x| Ok(x * 10))
///     .take(3);
/// assert_eq!(seqweld::sinks::collect(evens).await?, vec![20, 40, 60]);
/// # Ok(())
/// # }
/// ```
pub trait SequenceExt<T: Send + 'static>: Sized {
    fn into_sequence(self) -> Sequence<T>;

    /// See [`processors::map`](crate::processors::map)
    fn map<R, F>(self, f: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        crate::processors::map(self.into_sequence(), f)
    }

    /// See [`processors::then`](crate::processors::then)
    fn then<R, F, Fut>(self, f: F) -> Sequence<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        crate::processors::then(self.into_sequence(), f)
    }

    /// See [`processors::apply`](crate::processors::apply)
    fn apply<F>(self, f: F) -> Sequence<T>
    where
        T: Clone,
        F: Fn(T) -> Result<T> + Send + Sync + 'static,
    {
        crate::processors::apply(self.into_sequence(), f)
    }

    fn filter<F>(self, predicate: F) -> Sequence<T>
    where
        F: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        crate::processors::filter(self.into_sequence(), predicate)
    }

    fn inspect<F>(self, f: F) -> Sequence<T>
    where
        F: Fn(&Element<T>) + Send + Sync + 'static,
    {
        crate::processors::inspect(self.into_sequence(), f)
    }

    /// Drop failed elements
    fn ok(self) -> Sequence<T> {
        crate::processors::ok(self.into_sequence())
    }

    fn take(self, count: usize) -> Sequence<T> {
        crate::processors::take(self.into_sequence(), count)
    }

    fn skip(self, count: usize) -> Sequence<T> {
        crate::processors::skip(self.into_sequence(), count)
    }

    fn take_while<F>(self, predicate: F) -> Sequence<T>
    where
        F: FnMut(&T) -> Result<bool> + Send + 'static,
    {
        crate::processors::take_while(self.into_sequence(), predicate)
    }

    fn skip_while<F>(self, predicate: F) -> Sequence<T>
    where
        F: FnMut(&T) -> Result<bool> + Send + 'static,
    {
        crate::processors::skip_while(self.into_sequence(), predicate)
    }

    fn chunk(self, size: usize) -> Sequence<Vec<T>> {
        crate::processors::chunk(self.into_sequence(), size)
    }

    /// See [`combinators::buffer`](crate::combinators::buffer)
    fn buffer(self, capacity: usize) -> Sequence<T> {
        crate::combinators::buffer(self.into_sequence(), capacity)
    }

    /// See [`combinators::parallel`](crate::combinators::parallel)
    fn parallel(self, max_concurrency: usize) -> Sequence<T> {
        crate::combinators::parallel(self.into_sequence(), max_concurrency)
    }

    /// See [`combinators::split`](crate::combinators::split)
    fn split(self) -> (Sequence<T>, Sequence<T>)
    where
        T: Clone + Sync,
    {
        crate::combinators::split(self.into_sequence())
    }

    /// Continue with `other` once this sequence is exhausted
    fn chain(self, other: Sequence<T>) -> Sequence<T> {
        crate::combinators::concat([self.into_sequence(), other])
    }

    /// See [`combinators::zip`](crate::combinators::zip)
    fn zip<R: Send + 'static>(self, other: Sequence<R>) -> Sequence<Pair<T, R>> {
        crate::combinators::zip(self.into_sequence(), other)
    }
}

impl<T: Send + 'static> SequenceExt<T> for Sequence<T> {
    fn into_sequence(self) -> Sequence<T> {
        self
    }
}
