// ── Reactive store streams ──
//
// Subscription type for consuming changes to one store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one [`Store`](crate::Store).
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting into a `Stream`.
/// Intermediate values may be skipped by a slow reader; the latest one
/// is never missed.
pub struct StoreStream<T: Send + Sync + 'static> {
    current: Arc<T>,
    receiver: watch::Receiver<Arc<T>>,
}

impl<T: Send + Sync + 'static> StoreStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Arc<T> {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current value first, then
    /// every change.
    pub fn into_stream(self) -> StoreWatchStream<T> {
        StoreWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StoreWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Arc<T>>,
}

impl<T: Send + Sync + 'static> Stream for StoreWatchStream<T> {
    type Item = Arc<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream<Arc<T>> is Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use crate::store::Store;

    #[tokio::test]
    async fn changed_yields_new_snapshots() {
        let store = Store::new(0_u32);
        let mut sub = store.subscribe();
        assert_eq!(**sub.current(), 0);

        store.replace(5);
        assert_eq!(*sub.changed().await.unwrap(), 5);
        assert_eq!(**sub.current(), 5);
    }

    #[tokio::test]
    async fn stream_starts_with_current_value() {
        let store = Store::new("idle".to_owned());
        let mut stream = store.subscribe().into_stream();
        assert_eq!(stream.next().await.unwrap().as_str(), "idle");

        store.replace("playing".to_owned());
        assert_eq!(stream.next().await.unwrap().as_str(), "playing");
    }

    #[tokio::test]
    async fn changed_ends_when_store_drops() {
        let store = Store::new(1_u8);
        let mut sub = store.subscribe();
        drop(store);
        assert!(sub.changed().await.is_none());
        assert_eq!(*sub.latest(), 1);
    }
}
