//! Sequential concatenation of a group of sequences.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::{Element, Sequence, SharedSource};

/// Present `parts` as one sequence, in order.
///
/// The next part is only pulled once the current one is exhausted, so an
/// infinite part makes every later part unreachable. Safe to drive from
/// several tasks at once: element count and contents match the serial case.
pub fn concat<T, I>(parts: I) -> Sequence<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Sequence<T>>,
{
    Sequence::from_shared(Concat {
        parts: parts.into_iter().collect(),
        cursor: AtomicUsize::new(0),
    })
}

struct Concat<T> {
    parts: Vec<Sequence<T>>,
    /// Index of the active part; only ever moves forward by one.
    cursor: AtomicUsize,
}

#[async_trait]
impl<T: Send + 'static> SharedSource for Concat<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        loop {
            let index = self.cursor.load(Ordering::Acquire);
            let part = self.parts.get(index)?;

            if let Some(element) = part.next().await {
                return Some(element);
            }

            // Exhausted. Advance from the index we saw; if another caller
            // already moved on, just read again.
            if self
                .cursor
                .compare_exchange(index, index + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                trace!(index = index + 1, "concat advanced to next part");
            }
        }
    }

    async fn teardown(&self) {
        let from = self.cursor.load(Ordering::Acquire).min(self.parts.len());
        for part in &self.parts[from..] {
            part.stop().await;
        }
    }
}
