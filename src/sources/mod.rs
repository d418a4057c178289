//! Source constructors.
//!
//! Each constructor wraps a production function in a [`Sequence`].

use async_trait::async_trait;
use futures_core::Stream;
use std::collections::HashMap;
use std::future::Future;
use std::iter::Fuse;
use std::marker::PhantomData;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::core::{Element, Result, Sequence, Source};

/// A source that yields the items of an iterator
pub struct IterSource<I: Iterator> {
    iter: Fuse<I>,
}

impl<I: Iterator> IterSource<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter().fuse(),
        }
    }
}

#[async_trait]
impl<I> Source for IterSource<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    type Item = I::Item;

    async fn produce(&mut self) -> Option<Element<Self::Item>> {
        self.iter.next().map(Element::value)
    }
}

/// Build a sequence from a finite ordered collection.
pub fn from_iter<I>(items: I) -> Sequence<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    Sequence::new(IterSource::new(items))
}

/// Build a sequence from a collection of results; each `Err` becomes a
/// failed element and the sequence carries on.
pub fn from_results<I, T>(items: I) -> Sequence<T>
where
    I: IntoIterator<Item = Result<T>>,
    I::IntoIter: Send + 'static,
    T: Send + 'static,
{
    Sequence::new(ResultSource {
        iter: items.into_iter().fuse(),
    })
}

struct ResultSource<I> {
    iter: Fuse<I>,
}

#[async_trait]
impl<I, T> Source for ResultSource<I>
where
    I: Iterator<Item = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Item = T;

    async fn produce(&mut self) -> Option<Element<T>> {
        self.iter.next().map(Element::from)
    }
}

impl<T: Send + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        from_iter(items)
    }
}

/// Build a sequence of `(key, value)` entries. Order is unspecified.
pub fn from_map<K, V, S>(map: HashMap<K, V, S>) -> Sequence<(K, V)>
where
    K: Send + 'static,
    V: Send + 'static,
{
    from_iter(map.into_iter().collect::<Vec<_>>())
}

/// Build a sequence of the keys of a map. Order is unspecified.
pub fn keys<K, V, S>(map: HashMap<K, V, S>) -> Sequence<K>
where
    K: Send + 'static,
{
    from_iter(map.into_keys().collect::<Vec<_>>())
}

/// Build a sequence of the values of a map. Order is unspecified.
pub fn values<K, V, S>(map: HashMap<K, V, S>) -> Sequence<V>
where
    V: Send + 'static,
{
    from_iter(map.into_values().collect::<Vec<_>>())
}

/// A source fed by a push-based channel
pub struct ChannelSource<T> {
    rx: mpsc::Receiver<T>,
}

#[async_trait]
impl<T: Send + 'static> Source for ChannelSource<T> {
    type Item = T;

    async fn produce(&mut self) -> Option<Element<Self::Item>> {
        self.rx.recv().await.map(Element::value)
    }

    async fn teardown(&mut self) {
        // Senders observe the closed channel; anything already queued is dropped.
        self.rx.close();
    }
}

/// Build a sequence from the receiving half of a channel.
///
/// The sequence ends once every sender has been dropped and the queue is
/// drained.
pub fn from_channel<T: Send + 'static>(rx: mpsc::Receiver<T>) -> Sequence<T> {
    Sequence::new(ChannelSource { rx })
}

/// A source that pulls from an asynchronous stream
pub struct StreamSource<S> {
    stream: Pin<Box<S>>,
    done: bool,
}

#[async_trait]
impl<S> Source for StreamSource<S>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    type Item = S::Item;

    async fn produce(&mut self) -> Option<Element<Self::Item>> {
        if self.done {
            return None;
        }
        match self.stream.next().await {
            Some(item) => Some(Element::value(item)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Build a sequence from a stream of plain values.
pub fn from_stream<S>(stream: S) -> Sequence<S::Item>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    Sequence::new(StreamSource {
        stream: Box::pin(stream),
        done: false,
    })
}

/// A source created from an async closure
pub struct FnSource<F, Fut, T> {
    f: F,
    done: bool,
    _phantom: PhantomData<fn() -> (Fut, T)>,
}

#[async_trait]
impl<F, Fut, T> Source for FnSource<F, Fut, T>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Option<Element<T>>> + Send + 'static,
    T: Send + 'static,
{
    type Item = T;

    async fn produce(&mut self) -> Option<Element<Self::Item>> {
        if self.done {
            return None;
        }
        let element = (self.f)().await;
        if element.is_none() {
            self.done = true;
        }
        element
    }
}

/// Build a sequence from a production closure.
///
/// The closure is never called again once it has returned `None`.
pub fn from_fn<F, Fut, T>(f: F) -> Sequence<T>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Option<Element<T>>> + Send + 'static,
    T: Send + 'static,
{
    Sequence::new(FnSource {
        f,
        done: false,
        _phantom: PhantomData,
    })
}

/// A source that repeats a single value
pub struct RepeatSource<T> {
    value: T,
    remaining: Option<usize>,
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Source for RepeatSource<T> {
    type Item = T;

    async fn produce(&mut self) -> Option<Element<Self::Item>> {
        if let Some(ref mut rem) = self.remaining {
            if *rem == 0 {
                return None;
            }
            *rem -= 1;
        }
        Some(Element::value(self.value.clone()))
    }
}

/// An infinite sequence repeating `value`.
pub fn repeat<T: Clone + Send + Sync + 'static>(value: T) -> Sequence<T> {
    Sequence::new(RepeatSource {
        value,
        remaining: None,
    })
}

/// A sequence yielding `value` exactly `count` times.
pub fn repeat_n<T: Clone + Send + Sync + 'static>(value: T, count: usize) -> Sequence<T> {
    Sequence::new(RepeatSource {
        value,
        remaining: Some(count),
    })
}

/// A sequence with a single element.
pub fn once<T: Send + 'static>(value: T) -> Sequence<T> {
    from_iter(std::iter::once(value))
}

/// A sequence that is exhausted from the start.
pub fn empty<T: Send + 'static>() -> Sequence<T> {
    from_iter(Vec::new())
}
