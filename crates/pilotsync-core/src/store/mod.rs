// ── Reactive data store ──
//
// Single-writer, multi-reader state containers with push-based change
// notification.

mod data_store;
pub mod merge;

use std::sync::Arc;

use tokio::sync::watch;

use crate::stream::StoreStream;

pub use data_store::DashboardStore;
pub use merge::Merge;

/// One observable record.
///
/// Readers take cheap `Arc` snapshots or subscribe for changes. Writes
/// are crate-private and publish only when the value actually changed,
/// so a repeated identical update wakes no one.
pub struct Store<T> {
    sender: watch::Sender<Arc<T>>,
}

impl<T> Store<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Current value.
    pub fn snapshot(&self) -> Arc<T> {
        self.sender.borrow().clone()
    }

    /// Subscribe to future changes.
    pub fn subscribe(&self) -> StoreStream<T> {
        StoreStream::new(self.sender.subscribe())
    }

    /// Apply `f` to a copy of the current value and publish it if it
    /// differs. Returns whether anything changed.
    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        self.sender.send_if_modified(|current| {
            let mut next = T::clone(current);
            f(&mut next);
            if next == **current {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        })
    }

    /// Replace the value wholesale. Returns whether anything changed.
    pub(crate) fn replace(&self, value: T) -> bool {
        self.update(|current| *current = value)
    }
}

impl<T> Default for Store<T>
where
    T: Clone + Default + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}
