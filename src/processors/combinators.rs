//! Stateful transformation combinators: take, skip and chunk.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::SequenceConfig;
use crate::core::{Element, Error, Result, Sequence, SharedSource, Source};
use crate::processors::configured;

/// Only the first `count` elements of `seq`.
///
/// Safe under concurrent callers: each caller claims one of the `count`
/// slots before pulling upstream, so at most `count` elements are taken.
pub fn take<T: Send + 'static>(seq: Sequence<T>, count: usize) -> Sequence<T> {
    Sequence::from_shared(Take {
        upstream: seq,
        limit: count,
        claimed: AtomicUsize::new(0),
    })
}

struct Take<T> {
    upstream: Sequence<T>,
    limit: usize,
    claimed: AtomicUsize,
}

#[async_trait]
impl<T: Send + 'static> SharedSource for Take<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        self.claimed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .ok()?;
        self.upstream.next().await
    }

    async fn teardown(&self) {
        self.upstream.stop().await;
    }
}

/// Skip the first `count` elements of `seq`, failed ones included.
pub fn skip<T: Send + 'static>(seq: Sequence<T>, count: usize) -> Sequence<T> {
    Sequence::new(Skip {
        upstream: seq,
        remaining: count,
    })
}

struct Skip<T> {
    upstream: Sequence<T>,
    remaining: usize,
}

#[async_trait]
impl<T: Send + 'static> Source for Skip<T> {
    type Item = T;

    async fn produce(&mut self) -> Option<Element<T>> {
        while self.remaining > 0 {
            self.upstream.next().await?;
            self.remaining -= 1;
        }
        self.upstream.next().await
    }

    async fn teardown(&mut self) {
        self.upstream.stop().await;
    }
}

/// Yield values while `predicate` holds, then end.
///
/// Failed elements are passed along without being tested. Values are tested
/// in the order they are produced; the first value that fails the test ends
/// the sequence for every caller.
///
/// Example (in pseudocode): `take_while({1, 1, 2, 1, 1}, x -> x == 1) -> {1, 1}`
pub fn take_while<T, F>(seq: Sequence<T>, predicate: F) -> Sequence<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    take_while_with(seq, predicate, SequenceConfig::default())
}

pub fn take_while_with<T, F>(seq: Sequence<T>, predicate: F, config: SequenceConfig) -> Sequence<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    let out = Sequence::new(TakeWhile {
        upstream: seq,
        predicate,
        config: config.clone(),
        done: false,
    });
    configured(out, &config)
}

struct TakeWhile<T, F> {
    upstream: Sequence<T>,
    predicate: F,
    config: SequenceConfig,
    done: bool,
}

#[async_trait]
impl<T, F> Source for TakeWhile<T, F>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    type Item = T;

    async fn produce(&mut self) -> Option<Element<T>> {
        while !self.done {
            let element = self.upstream.next().await?;
            if element.is_failed() {
                return Some(element);
            }
            let Some(value) = element.into_parts().0 else { continue };

            match (self.predicate)(&value) {
                Ok(true) => return Some(Element::value(value)),
                Ok(false) => self.done = true,
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::with_failure(value, e));
                    }
                }
            }
        }
        None
    }

    async fn teardown(&mut self) {
        self.upstream.stop().await;
    }
}

/// Skip values while `predicate` holds; once it fails, yield everything.
///
/// Example (in pseudocode): `skip_while({1, 0, 2}, x -> x > 0) -> {0, 2}`
pub fn skip_while<T, F>(seq: Sequence<T>, predicate: F) -> Sequence<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    skip_while_with(seq, predicate, SequenceConfig::default())
}

pub fn skip_while_with<T, F>(seq: Sequence<T>, predicate: F, config: SequenceConfig) -> Sequence<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    let out = Sequence::new(SkipWhile {
        upstream: seq,
        predicate,
        config: config.clone(),
        skipping: true,
    });
    configured(out, &config)
}

struct SkipWhile<T, F> {
    upstream: Sequence<T>,
    predicate: F,
    config: SequenceConfig,
    skipping: bool,
}

#[async_trait]
impl<T, F> Source for SkipWhile<T, F>
where
    T: Send + 'static,
    F: FnMut(&T) -> Result<bool> + Send + 'static,
{
    type Item = T;

    async fn produce(&mut self) -> Option<Element<T>> {
        loop {
            let element = self.upstream.next().await?;
            if !self.skipping || element.is_failed() {
                return Some(element);
            }
            let Some(value) = element.into_parts().0 else { continue };

            match (self.predicate)(&value) {
                Ok(true) => {}
                Ok(false) => {
                    self.skipping = false;
                    return Some(Element::value(value));
                }
                Err(e) => {
                    if let Some(e) = self.config.handle(e) {
                        return Some(Element::with_failure(value, e));
                    }
                }
            }
        }
    }

    async fn teardown(&mut self) {
        self.upstream.stop().await;
    }
}

/// Group elements into vectors of `size` (zero is treated as one).
///
/// The last chunk may be shorter. Failures inside a chunk are joined and
/// attached to it.
pub fn chunk<T: Send + 'static>(seq: Sequence<T>, size: usize) -> Sequence<Vec<T>> {
    Sequence::new(Chunk {
        upstream: seq,
        size: size.max(1),
    })
}

struct Chunk<T> {
    upstream: Sequence<T>,
    size: usize,
}

#[async_trait]
impl<T: Send + 'static> Source for Chunk<T> {
    type Item = Vec<T>;

    async fn produce(&mut self) -> Option<Element<Vec<T>>> {
        let mut values = Vec::with_capacity(self.size);
        let mut failure: Option<Error> = None;

        for i in 0..self.size {
            let Some(element) = self.upstream.next().await else {
                if i == 0 {
                    return None;
                }
                break;
            };
            let (value, err) = element.into_parts();
            values.extend(value);
            failure = Error::join(failure, err);
        }

        Some(match failure {
            Some(e) => Element::with_failure(values, e),
            None => Element::value(values),
        })
    }

    async fn teardown(&mut self) {
        self.upstream.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::collect;
    use crate::sources::{from_iter, from_results, repeat};

    #[tokio::test]
    async fn test_take() {
        let taken = take(from_iter(1..11), 3);
        assert_eq!(collect(taken).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_take_zero_and_more_than_available() {
        assert!(collect(take(from_iter(0..5), 0)).await.unwrap().is_empty());
        assert_eq!(collect(take(from_iter(0..2), 10)).await.unwrap(), vec![0, 1]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_take_under_concurrent_callers() {
        let taken = take(repeat(1u32), 50);
        let mut handles = Vec::new();
        for _ in 0..5 {
            let taken = taken.clone();
            handles.push(tokio::spawn(async move {
                let mut n = 0;
                while taken.next().await.is_some() {
                    n += 1;
                }
                n
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 50);
    }

    #[tokio::test]
    async fn test_skip() {
        assert_eq!(collect(skip(from_iter(1..6), 2)).await.unwrap(), vec![3, 4, 5]);
        assert!(collect(skip(from_iter(1..3), 5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_take_while() {
        let taken = take_while(from_iter(vec![1, 1, 2, 1, 1]), |x| Ok(*x == 1));
        assert_eq!(collect(taken.clone()).await.unwrap(), vec![1, 1]);
        assert!(taken.next().await.is_none());
    }

    #[tokio::test]
    async fn test_skip_while() {
        let rest = skip_while(from_iter(vec![1, 0, 2]), |x| Ok(*x > 0));
        assert_eq!(collect(rest).await.unwrap(), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_chunk() {
        let chunks = collect(chunk(from_iter(1..8), 3)).await.unwrap();
        assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[tokio::test]
    async fn test_chunk_joins_failures() {
        let chunks = chunk(
            from_results(vec![
                Ok(1),
                Err(Error::custom("a")),
                Err(Error::custom("b")),
                Ok(4),
            ]),
            3,
        );

        let first = chunks.next().await.unwrap();
        assert_eq!(first.get(), Some(&vec![1]));
        assert!(matches!(first.error(), Some(Error::Joined(errors)) if errors.len() == 2));

        assert_eq!(chunks.next().await.unwrap(), vec![4]);
        assert!(chunks.next().await.is_none());
    }
}
