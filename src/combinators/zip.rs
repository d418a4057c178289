//! Paired zip of two sequences.

use async_trait::async_trait;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::core::{Element, Error, Sequence, Source};

/// Two values that belong together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pair<L, R> {
    pub left: L,
    pub right: R,
}

impl<L, R> Pair<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L, R> From<Pair<L, R>> for (L, R) {
    fn from(pair: Pair<L, R>) -> Self {
        (pair.left, pair.right)
    }
}

impl<L, R> From<(L, R)> for Pair<L, R> {
    fn from((left, right): (L, R)) -> Self {
        Self { left, right }
    }
}

/// Pair up the elements of `left` and `right`.
///
/// Each `next` pulls one element from each side. The zip is exhausted as
/// soon as either side is; the remaining elements of the longer side are
/// never observed through it. When both sides fail on the same step both
/// failures are kept in an [`Error::Joined`]; the pair value is only present
/// when both sides produced a value.
///
/// Each pair is pulled as one step, so concurrent callers of the zip never
/// see values from different positions paired up. The two sides are not
/// synchronized with anything else: if something else is also pulling from
/// one of them, the pairing is undefined.
pub fn zip<L, R>(left: Sequence<L>, right: Sequence<R>) -> Sequence<Pair<L, R>>
where
    L: Send + 'static,
    R: Send + 'static,
{
    Sequence::new(Zip { left, right })
}

struct Zip<L, R> {
    left: Sequence<L>,
    right: Sequence<R>,
}

#[async_trait]
impl<L, R> Source for Zip<L, R>
where
    L: Send + 'static,
    R: Send + 'static,
{
    type Item = Pair<L, R>;

    async fn produce(&mut self) -> Option<Element<Pair<L, R>>> {
        let left = self.left.next().await;
        let right = self.right.next().await;
        let (left, right) = (left?, right?);

        let (left_value, left_failure) = left.into_parts();
        let (right_value, right_failure) = right.into_parts();

        let value = match (left_value, right_value) {
            (Some(left), Some(right)) => Some(Pair { left, right }),
            _ => None,
        };
        Element::from_parts(value, Error::join(left_failure, right_failure))
    }

    async fn teardown(&mut self) {
        self.left.stop().await;
        self.right.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::collect;
    use crate::sources::{from_iter, from_results};

    #[tokio::test]
    async fn test_stops_at_shorter_side() {
        let left = from_iter(vec![1, 2]);
        let right = from_iter(vec!["a", "b", "c"]);
        let right_handle = right.clone();

        let pairs = collect(zip(left, right)).await.unwrap();
        assert_eq!(pairs, vec![Pair::new(1, "a"), Pair::new(2, "b")]);

        // the zip pulled "c" while discovering the left side was done
        assert!(right_handle.next().await.is_none());
    }

    #[tokio::test]
    async fn test_exhaustion_is_sticky() {
        let seq = zip(from_iter(vec![1]), from_iter(vec![1, 2, 3, 4]));
        assert!(seq.next().await.is_some());
        assert!(seq.next().await.is_none());
        assert!(seq.next().await.is_none());
    }

    #[tokio::test]
    async fn test_joins_failures() {
        let left = from_results(vec![Ok(1), Err(Error::custom("left")), Err(Error::custom("l3"))]);
        let right = from_results(vec![Ok('x'), Err(Error::custom("right")), Ok('z')]);
        let seq = zip(left, right);

        assert_eq!(seq.next().await.unwrap(), Pair::new(1, 'x'));

        let both = seq.next().await.unwrap();
        assert!(both.get().is_none());
        match both.error() {
            Some(Error::Joined(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected joined failure, got {:?}", other),
        }

        let one = seq.next().await.unwrap();
        assert_eq!(one.error().unwrap().to_string(), "l3");
        assert!(one.get().is_none());
    }

    #[tokio::test]
    async fn test_pair_tuple_conversion() {
        let pair: Pair<u8, char> = (1, 'q').into();
        let (l, r): (u8, char) = pair.into();
        assert_eq!((l, r), (1, 'q'));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_get_matching_pairs() {
        let seq = zip(from_iter(0..2000), from_iter(0..2000));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let seq = seq.clone();
            handles.push(tokio::spawn(async move {
                let mut pairs = Vec::new();
                while let Some(element) = seq.next().await {
                    pairs.push(element.into_result().unwrap());
                }
                pairs
            }));
        }

        let mut total = 0;
        for handle in handles {
            for pair in handle.await.unwrap() {
                assert_eq!(pair.left, pair.right);
                total += 1;
            }
        }
        assert_eq!(total, 2000);
    }
}
