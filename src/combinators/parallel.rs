//! Bounded parallel fan-out over a single sequence.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::{Element, Sequence, SharedSource};

/// Run up to `max_concurrency` concurrent `next` calls against `seq`.
///
/// Results are relayed to the consumer in completion order, so the output
/// order is unspecified; every element is still delivered exactly once.
/// A concurrency of zero degrades to a single worker.
///
/// Stopping signals the workers first: no new calls are issued, calls still
/// in flight are abandoned and their results are not delivered.
///
/// `seq` is pulled from several tasks at once, which every [`Sequence`]
/// allows. Production starts immediately on background tasks, so this
/// must be called from within a tokio runtime. Follow with
/// [`buffer`](crate::combinators::buffer) to let the workers run further
/// ahead of a slow consumer.
pub fn parallel<T: Send + 'static>(seq: Sequence<T>, max_concurrency: usize) -> Sequence<T> {
    let workers = max_concurrency.max(1);
    let (tx, rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();

    debug!(sequence = seq.label(), workers, "starting fan-out workers");
    let mut set = JoinSet::new();
    for worker in 0..workers {
        set.spawn(work(worker, seq.clone(), tx.clone(), cancel.clone()));
    }

    Sequence::from_shared(FanOut {
        rx: Mutex::new(rx),
        cancel,
        workers: Mutex::new(set),
        source: seq,
    })
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
async fn work<T: Send + 'static>(
    worker: usize,
    source: Sequence<T>,
    tx: mpsc::Sender<Element<T>>,
    cancel: CancellationToken,
) {
    loop {
        let element = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            element = source.next() => element,
        };
        let Some(element) = element else {
            break;
        };
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(element) => sent,
        };
        if sent.is_err() {
            break;
        }
    }
    trace!(sequence = source.label(), worker, "fan-out worker finished");
}

struct FanOut<T> {
    rx: Mutex<mpsc::Receiver<Element<T>>>,
    cancel: CancellationToken,
    workers: Mutex<JoinSet<()>>,
    source: Sequence<T>,
}

#[async_trait]
impl<T: Send + 'static> SharedSource for FanOut<T> {
    type Item = T;

    async fn produce(&self) -> Option<Element<T>> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            // Ends once every worker has finished and dropped its sender.
            element = rx.recv() => element,
        }
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    async fn teardown(&self) {
        self.cancel.cancel();
        // Results of calls still in flight are dropped from here on.
        self.rx.lock().await.close();

        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "fan-out worker ended abnormally");
            }
        }
        self.source.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::collect;
    use crate::sources::{from_channel, from_fn, from_iter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delivers_every_element_once() {
        for workers in [1, 2, 4, 16] {
            let out = parallel(from_iter(0..100), workers);
            let mut got = collect(out).await.unwrap();
            got.sort();
            assert_eq!(got, (0..100).collect::<Vec<_>>(), "workers {}", workers);
        }
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_serial() {
        let out = parallel(from_iter(vec![1, 2, 3]), 0);
        assert_eq!(collect(out).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlaps_slow_production() {
        // Each element takes a while to produce outside of the source lock,
        // so concurrent workers overlap on the delay.
        let next = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let source = from_fn({
            let next = Arc::clone(&next);
            move || {
                let n = next.fetch_add(1, Ordering::SeqCst);
                async move { (n < 8).then(|| Element::value(n)) }
            }
        });
        let slow = crate::processors::then(source, {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            move |n: usize| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(n)
                }
            }
        });

        let mut got = collect(parallel(slow, 4)).await.unwrap();
        got.sort();
        assert_eq!(got, (0..8).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_stop_reports_exhaustion() {
        let source = from_iter(0..1000);
        let handle = source.clone();
        let out = parallel(source, 3);

        assert!(out.next().await.is_some());
        out.stop().await;

        assert!(out.next().await.is_none());
        assert!(handle.next().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_releases_parked_consumer() {
        let (tx, rx) = tokio::sync::mpsc::channel::<u8>(1);
        let out = parallel(from_channel(rx), 3);

        let parked = tokio::spawn({
            let out = out.clone();
            async move { out.next().await.is_none() }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), out.stop())
            .await
            .expect("stop should not wait on an idle source");
        assert!(parked.await.unwrap());
        assert!(tx.is_closed());
    }
}
