// ── Snapshot store ──
//
// Holds the current Snapshot behind a `watch` channel. Replacement is
// wholesale and atomic from the consumer's point of view: readers hold
// an `Arc` to whichever snapshot was current when they looked.
//
// The store also tracks every reading id it has ever seen, so the
// coordinator can announce genuinely new readings (ids that vanish and
// later return are not re-announced).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Snapshot;

/// Reactive holder for the current snapshot.
pub struct SnapshotStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    /// All ids observed since construction. Std mutex: the critical
    /// section is a set diff, never held across an await.
    seen_ids: Mutex<HashSet<String>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            snapshot,
            last_refresh,
            seen_ids: Mutex::new(HashSet::new()),
        }
    }

    /// The current snapshot. Cheap -- clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Subscribe as a [`SnapshotStream`](crate::stream::SnapshotStream).
    pub fn subscribe_stream(&self) -> crate::stream::SnapshotStream {
        crate::stream::SnapshotStream::new(self.snapshot.subscribe())
    }

    /// Replace the snapshot wholesale and stamp the refresh time.
    ///
    /// Returns the ids never seen before, in snapshot order.
    pub(crate) fn replace(&self, next: Snapshot) -> Vec<String> {
        let next = Arc::new(next);

        let new_ids: Vec<String> = {
            let mut seen = self.seen_ids.lock().expect("seen-id lock poisoned");
            next.ids()
                .filter(|id| seen.insert((*id).to_owned()))
                .map(str::to_owned)
                .collect()
        };

        let _ = self.snapshot.send(next);
        let _ = self.last_refresh.send(Some(Utc::now()));

        new_ids
    }

    /// When the last successful refresh completed, or `None` if never.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How stale the current snapshot is, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotStore;
    use crate::model::{Reading, Snapshot, Value};

    fn snapshot_of(ids: &[&str]) -> Snapshot {
        let mut snap = Snapshot::new();
        for id in ids {
            snap.insert(Reading {
                id: (*id).to_owned(),
                display_name: (*id).to_owned(),
                value: Value::Int(1),
                unit: None,
            });
        }
        snap
    }

    #[test]
    fn replace_reports_only_never_seen_ids() {
        let store = SnapshotStore::new();

        let first = store.replace(snapshot_of(&["a", "b"]));
        assert_eq!(first, ["a", "b"]);

        let second = store.replace(snapshot_of(&["a", "b", "c"]));
        assert_eq!(second, ["c"]);

        // "b" vanishes, then returns: no re-announcement.
        store.replace(snapshot_of(&["a", "c"]));
        let fourth = store.replace(snapshot_of(&["a", "b", "c"]));
        assert!(fourth.is_empty());
    }

    #[test]
    fn replace_swaps_the_snapshot_wholesale() {
        let store = SnapshotStore::new();
        store.replace(snapshot_of(&["a"]));
        store.replace(snapshot_of(&["b"]));

        let snap = store.snapshot();
        assert!(snap.get("a").is_none());
        assert!(snap.get("b").is_some());
    }

    #[test]
    fn last_refresh_is_stamped_on_replace() {
        let store = SnapshotStore::new();
        assert!(store.last_refresh().is_none());
        assert!(store.data_age().is_none());

        store.replace(snapshot_of(&["a"]));
        assert!(store.last_refresh().is_some());
        assert!(store.data_age().expect("age available") >= chrono::Duration::zero());
    }

    #[tokio::test]
    async fn subscribers_observe_replacements() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();

        store.replace(snapshot_of(&["a"]));
        rx.changed().await.expect("sender alive");
        assert!(rx.borrow_and_update().get("a").is_some());
    }
}
