//! Prefetch buffer: production runs ahead of consumption on a background task.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{Element, Sequence, SharedSource};

/// Read ahead in `seq` by up to `capacity` elements.
///
/// Production starts immediately on a background task and fills the holding
/// area before the first call to `next`. Every element taken out frees one
/// slot, which lets exactly one more element be produced. Order and failures
/// are passed through unchanged. A capacity of zero is treated as one.
///
/// Stopping the buffer ends production at once: a production call still in
/// flight is abandoned and the source is stopped. Elements already in the
/// holding area stay retrievable through `next` until it is empty.
///
/// Must be called from within a tokio runtime.
pub fn buffer<T: Send + 'static>(seq: Sequence<T>, capacity: usize) -> Sequence<T> {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let cancel = CancellationToken::new();

    debug!(sequence = seq.label(), capacity, "starting prefetch task");
    let task = tokio::spawn(fill(seq.clone(), tx, cancel.clone()));

    Sequence::from_shared(Prefetch {
        rx: Mutex::new(rx),
        cancel,
        task: Mutex::new(Some(task)),
        source: seq,
    })
}

/// Keep the holding area full until the source is exhausted, the consumer
/// goes away, or replacements are cancelled.
async fn fill<T: Send + 'static>(
    source: Sequence<T>,
    tx: mpsc::Sender<Element<T>>,
    cancel: CancellationToken,
) {
    loop {
        // Claim a free slot before producing so no more than `capacity`
        // elements are ever produced ahead of the consumer.
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = tx.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let element = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            element = source.next() => element,
        };
        match element {
            Some(element) => permit.send(element),
            None => break,
        }
    }
    trace!(sequence = source.label(), "prefetch task finished");
}

struct Prefetch<T> {
    rx: Mutex<mpsc::Receiver<Element<T>>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    source: Sequence<T>,
}

#[async_trait]
impl<T: Send + 'static> SharedSource for Prefetch<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        // Ends once the fill task has finished and the holding area is empty.
        self.rx.lock().await.recv().await
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    async fn teardown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "prefetch task ended abnormally");
            }
        }
        self.source.stop().await;
    }

    fn drains_after_stop(&self) -> bool {
        true
    }
}
