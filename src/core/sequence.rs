//! The sequence handle.

use async_trait::async_trait;
use futures_core::Stream;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::core::element::Element;
use crate::core::traits::{SharedSource, Source};
use crate::metrics;

enum State<T> {
    Live(Box<dyn SharedSource<Item = T>>),
    /// Stopped, but still handing out what was produced before the stop.
    Draining(Box<dyn SharedSource<Item = T>>),
    Stopped,
}

struct Shared<T> {
    state: RwLock<State<T>>,
    exhausted: AtomicBool,
}

/// A pull-based, potentially infinite sequence of elements.
///
/// `Sequence` is a cheap, cloneable handle: every clone drives the same
/// underlying production function. `next` may be called from many tasks at
/// once and each produced element is delivered to exactly one caller.
///
/// A sequence ends either by exhaustion (the production function returned
/// `None`) or by [`stop`](Sequence::stop). Both are permanent; a stopped
/// sequence never produces anything new, though a prefetching one still
/// hands out what it had already buffered.
pub struct Sequence<T> {
    shared: Arc<Shared<T>>,
    name: Option<Arc<str>>,
}

impl<T: Send + 'static> Sequence<T> {
    /// Build a sequence from a plain production function.
    ///
    /// Calls to the source are serialized.
    pub fn new<S>(source: S) -> Self
    where
        S: Source<Item = T>,
    {
        Self::from_shared(Serialized {
            source: Mutex::new(source),
        })
    }

    /// Build a sequence from a production function that synchronizes its
    /// own concurrent callers.
    pub fn from_shared<S>(source: S) -> Self
    where
        S: SharedSource<Item = T>,
    {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State::Live(Box::new(source))),
                exhausted: AtomicBool::new(false),
            }),
            name: None,
        }
    }

    /// Attach a name used in log events and metric labels.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Pull the next element, or `None` once the sequence is exhausted or
    /// stopped.
    pub async fn next(&self) -> Option<Element<T>> {
        if self.shared.exhausted.load(Ordering::Acquire) {
            return None;
        }

        // Held for the whole production call so that stop() waits for us.
        let state = self.shared.state.read().await;
        let source = match &*state {
            State::Live(source) | State::Draining(source) => source,
            State::Stopped => return None,
        };

        let element = source.produce().await;
        match &element {
            Some(element) => metrics::element(self.label(), element.is_failed()),
            None => {
                if !self.shared.exhausted.swap(true, Ordering::AcqRel) {
                    debug!(sequence = self.label(), "sequence exhausted");
                    metrics::exhausted(self.label());
                }
            }
        }
        element
    }

    /// Stop the sequence.
    ///
    /// Signals the production function to wind down, waits for in-flight
    /// `next` calls to finish, runs the teardown and releases the function.
    /// Nothing new is produced afterwards; every later `next` returns `None`
    /// unless the function opted to drain elements it produced before the
    /// stop (see [`SharedSource::drains_after_stop`]). Calling `stop` again
    /// is a no-op.
    pub async fn stop(&self) {
        {
            let state = self.shared.state.read().await;
            if let State::Live(source) = &*state {
                source.cancel();
            }
        }

        let mut state = self.shared.state.write().await;
        match std::mem::replace(&mut *state, State::Stopped) {
            State::Live(source) => {
                source.teardown().await;
                if source.drains_after_stop() {
                    *state = State::Draining(source);
                }
                debug!(sequence = self.label(), "sequence stopped");
                metrics::stopped(self.label());
            }
            other => *state = other,
        }
    }

    /// Whether the production function has reported exhaustion.
    pub fn is_exhausted(&self) -> bool {
        self.shared.exhausted.load(Ordering::Acquire)
    }

    /// Convert into a [`Stream`] of elements.
    ///
    /// The stream ends when the sequence is exhausted or stopped.
    pub fn into_stream(self) -> impl Stream<Item = Element<T>> + Send {
        futures::stream::unfold(self, |seq| async move {
            let element = seq.next().await?;
            Some((element, seq))
        })
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            name: self.name.clone(),
        }
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("exhausted", &self.shared.exhausted.load(Ordering::Relaxed))
            .finish()
    }
}

/// Adapts a `&mut self` source to concurrent callers by taking turns.
struct Serialized<S> {
    source: Mutex<S>,
}

#[async_trait]
impl<S: Source> SharedSource for Serialized<S> {
    type Item = S::Item;

    async fn produce(&self) -> Option<Element<Self::Item>> {
        self.source.lock().await.produce().await
    }

    async fn teardown(&self) {
        self.source.lock().await.teardown().await;
    }
}
