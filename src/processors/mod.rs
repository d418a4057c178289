//! Sequential transformation combinators.
//!
//! Stateless transformations (`map`, `then`, `apply`, `filter`, `inspect`,
//! `ok`) run the caller's function outside of any lock, so several tasks
//! pulling the output at once also run the function concurrently. The
//! stateful ones live in [`combinators`].
//!
//! Failures arriving from upstream are passed along without calling the
//! caller's function. Failures from the caller's function are handled
//! according to the [`ErrorPolicy`](crate::config::ErrorPolicy) of the
//! supplied [`SequenceConfig`].

pub mod appliers;
pub mod combinators;

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

use crate::config::SequenceConfig;
use crate::core::{Element, Result, Sequence, SharedSource};

pub use combinators::{chunk, skip, skip_while, skip_while_with, take, take_while, take_while_with};

pub(crate) fn configured<T: Send + 'static>(seq: Sequence<T>, config: &SequenceConfig) -> Sequence<T> {
    match &config.name {
        Some(name) => seq.named(name.clone()),
        None => seq,
    }
}

/// Transform each value with a fallible mapper.
///
/// Example (in pseudocode): `map({1, 2, 3}, is_even) -> {false, true, false}`
pub fn map<T, R, F>(seq: Sequence<T>, f: F) -> Sequence<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    map_with(seq, f, SequenceConfig::default())
}

pub fn map_with<T, R, F>(seq: Sequence<T>, f: F, config: SequenceConfig) -> Sequence<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    let out = Sequence::from_shared(Map {
        upstream: seq,
        f,
        config: config.clone(),
        _phantom: PhantomData,
    });
    configured(out, &config)
}

/// A sequence that maps values through a function
struct Map<T, R, F> {
    upstream: Sequence<T>,
    f: F,
    config: SequenceConfig,
    _phantom: PhantomData<fn() -> R>,
}

#[async_trait]
impl<T, R, F> SharedSource for Map<T, R, F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    type Item = R;

    async fn produce(&self) -> Option<Element<R>> {
        loop {
            let (value, failure) = self.upstream.next().await?.into_parts();
            if let Some(e) = failure {
                return Some(Element::failure(e));
            }
            let Some(value) = value else { continue };

            match (self.f)(value) {
                Ok(mapped) => return Some(Element::value(mapped)),
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::failure(e));
                    }
                }
            }
        }
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Transform each value with a fallible asynchronous function.
pub fn then<T, R, F, Fut>(seq: Sequence<T>, f: F) -> Sequence<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    then_with(seq, f, SequenceConfig::default())
}

pub fn then_with<T, R, F, Fut>(seq: Sequence<T>, f: F, config: SequenceConfig) -> Sequence<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let out = Sequence::from_shared(Then {
        upstream: seq,
        f,
        config: config.clone(),
        _phantom: PhantomData,
    });
    configured(out, &config)
}

struct Then<T, R, F, Fut> {
    upstream: Sequence<T>,
    f: F,
    config: SequenceConfig,
    _phantom: PhantomData<fn() -> (R, Fut)>,
}

#[async_trait]
impl<T, R, F, Fut> SharedSource for Then<T, R, F, Fut>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    type Item = R;

    async fn produce(&self) -> Option<Element<R>> {
        loop {
            let (value, failure) = self.upstream.next().await?.into_parts();
            if let Some(e) = failure {
                return Some(Element::failure(e));
            }
            let Some(value) = value else { continue };

            match (self.f)(value).await {
                Ok(mapped) => return Some(Element::value(mapped)),
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::failure(e));
                    }
                }
            }
        }
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Transform each value without changing its type.
///
/// Unlike [`map`], a failed upstream element keeps its value. When the
/// function fails, the original value travels with the failure.
///
/// Example (in pseudocode): `apply({1, 2, 3}, x -> 2 * x) -> {2, 4, 6}`
pub fn apply<T, F>(seq: Sequence<T>, f: F) -> Sequence<T>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync + 'static,
{
    apply_with(seq, f, SequenceConfig::default())
}

pub fn apply_with<T, F>(seq: Sequence<T>, f: F, config: SequenceConfig) -> Sequence<T>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync + 'static,
{
    let out = Sequence::from_shared(Apply {
        upstream: seq,
        f,
        config: config.clone(),
    });
    configured(out, &config)
}

struct Apply<T, F> {
    upstream: Sequence<T>,
    f: F,
    config: SequenceConfig,
}

#[async_trait]
impl<T, F> SharedSource for Apply<T, F>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync + 'static,
{
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        loop {
            let element = self.upstream.next().await?;
            if element.is_failed() {
                return Some(element);
            }
            let Some(value) = element.into_parts().0 else { continue };

            match (self.f)(value.clone()) {
                Ok(applied) => return Some(Element::value(applied)),
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::with_failure(value, e));
                    }
                }
            }
        }
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Keep the values for which the predicate returns true.
///
/// Example (in pseudocode): `filter({0, 1, 2}, x -> x > 0) -> {1, 2}`
pub fn filter<T, F>(seq: Sequence<T>, predicate: F) -> Sequence<T>
where
    T: Send + 'static,
    F: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    filter_with(seq, predicate, SequenceConfig::default())
}

pub fn filter_with<T, F>(seq: Sequence<T>, predicate: F, config: SequenceConfig) -> Sequence<T>
where
    T: Send + 'static,
    F: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    let out = Sequence::from_shared(Filter {
        upstream: seq,
        predicate,
        config: config.clone(),
    });
    configured(out, &config)
}

struct Filter<T, F> {
    upstream: Sequence<T>,
    predicate: F,
    config: SequenceConfig,
}

#[async_trait]
impl<T, F> SharedSource for Filter<T, F>
where
    T: Send + 'static,
    F: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        loop {
            let element = self.upstream.next().await?;
            if element.is_failed() {
                return Some(element);
            }
            let Some(value) = element.into_parts().0 else { continue };

            match (self.predicate)(&value) {
                Ok(true) => return Some(Element::value(value)),
                Ok(false) => {}
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::with_failure(value, e));
                    }
                }
            }
        }
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Call `f` on every element, then pass it along unchanged.
pub fn inspect<T, F>(seq: Sequence<T>, f: F) -> Sequence<T>
where
    T: Send + 'static,
    F: Fn(&Element<T>) + Send + Sync + 'static,
{
    Sequence::from_shared(Inspect { upstream: seq, f })
}

struct Inspect<T, F> {
    upstream: Sequence<T>,
    f: F,
}

#[async_trait]
impl<T, F> SharedSource for Inspect<T, F>
where
    T: Send + 'static,
    F: Fn(&Element<T>) + Send + Sync + 'static,
{
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        let element = self.upstream.next().await?;
        (self.f)(&element);
        Some(element)
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Skip every element that carries a failure.
pub fn ok<T: Send + 'static>(seq: Sequence<T>) -> Sequence<T> {
    Sequence::from_shared(SkipFailed { upstream: seq })
}

struct SkipFailed<T> {
    upstream: Sequence<T>,
}

#[async_trait]
impl<T: Send + 'static> SharedSource for SkipFailed<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        loop {
            let element = self.upstream.next().await?;
            if element.is_ok() {
                return Some(element);
            }
        }
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}
