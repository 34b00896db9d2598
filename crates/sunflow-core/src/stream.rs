// ── Reactive snapshot stream ──
//
// Subscription adapter for consuming snapshot replacements as a
// `Stream`, for consumers that prefer combinators over polling
// `watch::Receiver::changed` in a loop.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

/// A subscription to snapshot replacements.
///
/// Provides both point-in-time access and reactive change
/// notification via [`changed`](Self::changed) or conversion to a
/// `Stream`.
pub struct SnapshotStream {
    current: Arc<Snapshot>,
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time.
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement, returning the new snapshot.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields an `Arc<Snapshot>` for the current state immediately, then
/// one per replacement.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<Snapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream<Arc<Snapshot>> is Unpin, so this projection is safe.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reading, Value};
    use crate::store::SnapshotStore;

    fn one_reading(id: &str) -> Snapshot {
        let mut snap = Snapshot::new();
        snap.insert(Reading {
            id: id.into(),
            display_name: id.into(),
            value: Value::Int(1),
            unit: None,
        });
        snap
    }

    #[tokio::test]
    async fn changed_yields_each_replacement() {
        let store = SnapshotStore::new();
        let mut stream = SnapshotStream::new(store.subscribe());
        assert!(stream.current().is_empty());

        store.replace(one_reading("a"));
        let snap = stream.changed().await.expect("store alive");
        assert!(snap.get("a").is_some());
        assert!(stream.current().get("a").is_some());
    }

    #[tokio::test]
    async fn latest_reflects_replacements_without_awaiting() {
        let store = SnapshotStore::new();
        let stream = SnapshotStream::new(store.subscribe());

        store.replace(one_reading("a"));
        assert!(stream.latest().get("a").is_some());
        // The creation-time view is unchanged.
        assert!(stream.current().is_empty());
    }
}
