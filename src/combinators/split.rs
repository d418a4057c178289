//! Synchronized split: two handles that each observe the whole source.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::Mutex;

use crate::core::{Element, Sequence, SharedSource};

/// Split `seq` into two handles that both see every element exactly once,
/// in source order.
///
/// Whichever branch needs a new element first fetches it from the source
/// and publishes a copy to both branches. Each branch holds at most one
/// element it has not taken yet, so a branch can run at most one element
/// ahead of the other; drive the two branches from separate tasks when they
/// pull at different rates. Once one branch is stopped, the other keeps
/// receiving the source on its own. The source is stopped once both
/// branches have been stopped, or one stopped and the other dropped.
pub fn split<T>(seq: Sequence<T>) -> (Sequence<T>, Sequence<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let (a_tx, a_rx) = mpsc::channel(1);
    let (b_tx, b_rx) = mpsc::channel(1);
    let fetch = Arc::new(Mutex::new(Fetch {
        source: seq,
        relays: Some([a_tx, b_tx]),
    }));
    let live = Arc::new(AtomicUsize::new(2));

    let a = Branch {
        side: 0,
        slot: Mutex::new(a_rx),
        fetch: Arc::clone(&fetch),
        live: Arc::clone(&live),
        released: AtomicBool::new(false),
    };
    let b = Branch {
        side: 1,
        slot: Mutex::new(b_rx),
        fetch,
        live,
        released: AtomicBool::new(false),
    };
    (Sequence::from_shared(a), Sequence::from_shared(b))
}

/// State owned by whichever branch currently holds the fetch lock.
struct Fetch<T> {
    source: Sequence<T>,
    /// Single-slot relays, indexed by branch; `None` once the source is
    /// exhausted, which closes both.
    relays: Option<[mpsc::Sender<Element<T>>; 2]>,
}

impl<T: Clone + Send + 'static> Fetch<T> {
    /// Fetch one element and hand it to both branches, the caller first.
    async fn publish(&mut self, side: usize) {
        if self.relays.is_none() {
            return;
        }

        match self.source.next().await {
            Some(element) => {
                if let Some(relays) = &self.relays {
                    // A send only fails when that branch is gone.
                    let _ = relays[side].send(element.clone()).await;
                    let _ = relays[1 - side].send(element).await;
                }
            }
            None => {
                trace!(sequence = self.source.label(), "split source exhausted");
                self.relays = None;
            }
        }
    }
}

struct Branch<T> {
    side: usize,
    slot: Mutex<mpsc::Receiver<Element<T>>>,
    fetch: Arc<Mutex<Fetch<T>>>,
    /// Branches not yet stopped or dropped.
    live: Arc<AtomicUsize>,
    released: AtomicBool,
}

impl<T> Branch<T> {
    /// Give up this branch's share of the source; true for the last one.
    fn release(&self) -> bool {
        !self.released.swap(true, Ordering::AcqRel) && self.live.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

impl<T> Drop for Branch<T> {
    fn drop(&mut self) {
        self.release();
    }
}

fn ready<T>(result: Result<Element<T>, TryRecvError>) -> Option<Option<Element<T>>> {
    match result {
        Ok(element) => Some(Some(element)),
        Err(TryRecvError::Disconnected) => Some(None),
        Err(TryRecvError::Empty) => None,
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> SharedSource for Branch<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        let mut slot = self.slot.lock().await;
        loop {
            if let Some(element) = ready(slot.try_recv()) {
                return element;
            }

            // Whoever holds the fetch lock may leave without publishing, so
            // keep competing for it while waiting on the slot.
            let mut fetch = match self.fetch.try_lock() {
                Ok(fetch) => fetch,
                Err(_) => tokio::select! {
                    biased;
                    element = slot.recv() => return element,
                    fetch = self.fetch.lock() => fetch,
                },
            };

            // All publishing happens under this lock, so the slot is stable
            // now; the other branch may have filled it since we looked.
            if let Some(element) = ready(slot.try_recv()) {
                return element;
            }
            fetch.publish(self.side).await;
        }
    }

    async fn teardown(&self) {
        // Closing first unblocks the other branch if it is waiting to
        // publish into our slot while holding the fetch lock.
        self.slot.lock().await.close();

        if self.release() {
            let source = self.fetch.lock().await.source.clone();
            source.stop().await;
        }
    }
}
