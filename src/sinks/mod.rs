//! Terminal operations that drain a sequence.
//!
//! Every function here pulls until the sequence reports exhaustion (or,
//! for the fallible ones, until the first failure). None of them stop the
//! sequence; a caller that returns early still owns the handle and decides
//! whether to stop it.

use crate::config::SequenceConfig;
use crate::core::{Result, Sequence};

/// Fold every value into an accumulator.
///
/// Returns the first failure met, whether it was carried by an element or
/// returned by `reducer`.
///
/// Example (in pseudocode): `reduce({1, 2, 3}, 0, (acc, x) -> acc + x) -> 6`
pub async fn reduce<T, A, F>(seq: Sequence<T>, init: A, mut reducer: F) -> Result<A>
where
    T: Send + 'static,
    F: FnMut(A, T) -> Result<A>,
{
    let mut acc = init;
    while let Some(element) = seq.next().await {
        acc = reducer(acc, element.into_result()?)?;
    }
    Ok(acc)
}

/// Fold every value into an accumulator of the item type, starting from
/// `T::default()`.
pub async fn coalesce<T, F>(seq: Sequence<T>, reducer: F) -> Result<T>
where
    T: Default + Clone + Send + 'static,
    F: FnMut(T, T) -> Result<T>,
{
    coalesce_with(seq, reducer, SequenceConfig::default()).await
}

/// Like [`coalesce`], with failures routed through the config's
/// [`ErrorPolicy`](crate::config::ErrorPolicy).
///
/// Under `Propagate` the first failure is returned. Under `Report` failed
/// elements are reported and skipped, and a failing `reducer` leaves the
/// accumulator at the value it had before the call.
pub async fn coalesce_with<T, F>(seq: Sequence<T>, mut reducer: F, config: SequenceConfig) -> Result<T>
where
    T: Default + Clone + Send + 'static,
    F: FnMut(T, T) -> Result<T>,
{
    let mut acc = T::default();
    while let Some(element) = seq.next().await {
        let value = match element.into_result() {
            Ok(value) => value,
            Err(e) => match config.handle(e) {
                Some(e) => return Err(e),
                None => continue,
            },
        };

        match reducer(acc.clone(), value) {
            Ok(next) => acc = next,
            Err(e) => {
                if let Some(e) = config.handle(e) {
                    return Err(e);
                }
            }
        }
    }
    Ok(acc)
}

/// Gather every value in order, stopping at the first failure.
pub async fn collect<T: Send + 'static>(seq: Sequence<T>) -> Result<Vec<T>> {
    let mut values = Vec::new();
    while let Some(element) = seq.next().await {
        values.push(element.into_result()?);
    }
    Ok(values)
}

/// Count every produced element, failed ones included.
pub async fn count<T: Send + 'static>(seq: Sequence<T>) -> usize {
    let mut n = 0;
    while seq.next().await.is_some() {
        n += 1;
    }
    n
}

/// Call `f` on every value, stopping at the first failure.
pub async fn for_each<T, F>(seq: Sequence<T>, mut f: F) -> Result<()>
where
    T: Send + 'static,
    F: FnMut(T) -> Result<()>,
{
    while let Some(element) = seq.next().await {
        f(element.into_result()?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::sources::{from_iter, from_results};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_reduce() {
        let total = reduce(from_iter(1..=3), 0, |acc, x| Ok(acc + x)).await;
        assert_eq!(total.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_reduce_stops_at_first_failure() {
        let seq = from_results(vec![Ok(1), Err(Error::custom("first")), Ok(3)]);
        let err = reduce(seq.clone(), 0, |acc, x| Ok(acc + x)).await.unwrap_err();
        assert_eq!(err.to_string(), "first");
        // the rest is still there
        assert_eq!(seq.next().await.unwrap(), 3);

        let err = reduce(from_iter(vec![1, 2]), 0, |_, _| -> Result<i32> {
            Err(Error::custom("reducer"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "reducer");
    }

    #[tokio::test]
    async fn test_coalesce() {
        let words = from_iter(vec!["a".to_string(), "b".to_string()]);
        let joined = coalesce(words, |acc: String, x: String| Ok(acc + &x)).await;
        assert_eq!(joined.unwrap(), "ab");

        let total = coalesce(from_iter(vec![2u64, 3, 4]), |acc, x| Ok(acc + x)).await;
        assert_eq!(total.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_coalesce_with_report_skips_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let config = SequenceConfig::new().on_error({
            let seen = Arc::clone(&seen);
            move |e: &Error| seen.lock().unwrap().push(e.to_string())
        });
        let seq = from_results(vec![Ok(1), Err(Error::custom("skip me")), Ok(5)]);

        let total = coalesce_with(seq, |acc: i32, x| Ok(acc + x), config).await;
        assert_eq!(total.unwrap(), 6);
        assert_eq!(*seen.lock().unwrap(), vec!["skip me"]);
    }

    #[tokio::test]
    async fn test_collect_count_for_each() {
        assert_eq!(collect(from_iter(0..4)).await.unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(
            count(from_results(vec![Ok(1), Err(Error::custom("x"))])).await,
            2
        );

        let mut seen = Vec::new();
        for_each(from_iter(vec!['a', 'b']), |c| {
            seen.push(c);
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(seen, vec!['a', 'b']);
    }
}
