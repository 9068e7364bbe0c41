// ── Live row table ──
//
// Keyed, reactive storage for the display rows. Lock-free reads via
// `DashMap`, push-based change notification via `watch` channels.
//
// Merge policy is a sticky union: rows are updated in place or appended,
// never pruned. A device that ages out of the fetch window stays visible
// until the hosting view is torn down — disappearing rows would hide
// exactly the devices a creep check cares about.

use std::cmp::Ordering;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::DashMap;
use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::DeviceKey;
use crate::project::CreepRow;

/// Snapshot type published to subscribers: sorted, cheaply cloneable.
pub type RowSnapshot = Arc<Vec<Arc<CreepRow>>>;

/// The persistent display surface backing the live view.
pub struct RowTable {
    by_key: DashMap<DeviceKey, Arc<CreepRow>>,
    /// Version counter, bumped on every merge that changed anything.
    version: watch::Sender<u64>,
    /// Sorted snapshot, rebuilt on mutation.
    snapshot: watch::Sender<RowSnapshot>,
}

impl RowTable {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Merge a batch of projected rows into the table.
    ///
    /// Rows whose key already exists replace the stored row; new keys are
    /// added. Existing rows not present in `rows` are left untouched. One
    /// snapshot rebuild per batch, not per row.
    pub fn merge(&self, rows: Vec<CreepRow>) {
        if rows.is_empty() {
            return;
        }
        for row in rows {
            self.by_key.insert(row.key.clone(), Arc::new(row));
        }
        self.rebuild_snapshot();
        self.version.send_modify(|v| *v += 1);
    }

    /// Look up a row by device key (the row-activation path).
    pub fn get(&self, key: &DeviceKey) -> Option<Arc<CreepRow>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Current sorted snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> RowSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> RowStream {
        RowStream::new(self.snapshot.subscribe())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Collect all rows, sort, and broadcast. `send_modify` publishes
    /// even with zero receivers, so the snapshot accessor stays fresh.
    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<CreepRow>> =
            self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| row_order(a, b));
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

impl Default for RowTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Display order: signal strength descending, then creep distance
/// descending. Rows with no signal sort after every row that has one
/// (`Option`'s `None < Some(_)` ordering, reversed).
fn row_order(a: &CreepRow, b: &CreepRow) -> Ordering {
    b.rssi
        .cmp(&a.rssi)
        .then_with(|| b.distance.total_cmp(&a.distance))
}

// ── Subscription ────────────────────────────────────────────────────

/// A subscription to the row table.
///
/// Provides point-in-time snapshot access plus reactive change
/// notification via `changed()` or conversion to a `Stream`.
pub struct RowStream {
    current: RowSnapshot,
    receiver: watch::Receiver<RowSnapshot>,
}

impl RowStream {
    fn new(receiver: watch::Receiver<RowSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or last `changed()`) time.
    pub fn current(&self) -> &RowSnapshot {
        &self.current
    }

    /// The latest snapshot (may have changed since `current`).
    pub fn latest(&self) -> RowSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the table has been dropped.
    pub async fn changed(&mut self) -> Option<RowSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> RowWatchStream {
        RowWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the table's `watch` channel.
pub struct RowWatchStream {
    inner: WatchStream<RowSnapshot>,
}

impl Stream for RowWatchStream {
    type Item = RowSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn row(key: &str, rssi: Option<i32>, distance: f64) -> CreepRow {
        CreepRow {
            key: key.into(),
            ssid: format!("net-{key}"),
            device_type: "Wi-Fi AP".into(),
            macaddr: "aa:bb:cc:dd:ee:ff".into(),
            manufacturer: "Acme".into(),
            rssi,
            lat: 37.7,
            lon: -122.4,
            distance,
        }
    }

    #[test]
    fn merge_appends_new_and_replaces_existing() {
        let table = RowTable::new();
        table.merge(vec![row("a", Some(-50), 1.0), row("b", Some(-60), 2.0)]);
        assert_eq!(table.len(), 2);

        // Same key, updated fields: replaced in place, no duplicate.
        table.merge(vec![row("a", Some(-45), 1.5)]);
        assert_eq!(table.len(), 2);
        let a = table.get(&"a".into()).unwrap();
        assert_eq!(a.rssi, Some(-45));
        assert!((a.distance - 1.5).abs() < f64::EPSILON);

        // Unrelated row untouched.
        let b = table.get(&"b".into()).unwrap();
        assert_eq!(b.rssi, Some(-60));
    }

    #[test]
    fn rows_are_never_pruned_by_later_merges() {
        let table = RowTable::new();
        table.merge(vec![row("a", Some(-50), 1.0), row("b", Some(-60), 2.0)]);

        // A later batch that doesn't mention "a" leaves it in place.
        table.merge(vec![row("b", Some(-55), 2.0)]);
        assert_eq!(table.len(), 2);
        assert!(table.get(&"a".into()).is_some());
    }

    #[test]
    fn snapshot_sorts_by_rssi_then_distance_desc() {
        let table = RowTable::new();
        table.merge(vec![
            row("quiet", None, 9.0),
            row("strong-near", Some(-40), 0.1),
            row("weak", Some(-80), 5.0),
            row("strong-far", Some(-40), 3.0),
        ]);

        let snapshot = table.snapshot();
        let keys: Vec<&str> = snapshot.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["strong-far", "strong-near", "weak", "quiet"]);
    }

    #[test]
    fn empty_merge_is_a_no_op() {
        let table = RowTable::new();
        table.merge(vec![row("a", Some(-50), 1.0)]);
        let before = table.snapshot();
        table.merge(Vec::new());
        assert!(Arc::ptr_eq(&before, &table.snapshot()));
    }

    #[tokio::test]
    async fn subscribers_see_merges() {
        let table = RowTable::new();
        let mut sub = table.subscribe();
        assert!(sub.current().is_empty());

        table.merge(vec![row("a", Some(-50), 1.0)]);
        let snap = sub.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(sub.current().len(), 1);
    }

    #[tokio::test]
    async fn stream_adapter_yields_snapshots() {
        let table = RowTable::new();
        let mut stream = table.subscribe().into_stream();

        // WatchStream yields the current value first.
        let initial = stream.next().await.unwrap();
        assert!(initial.is_empty());

        table.merge(vec![row("a", Some(-50), 1.0)]);
        let snap = stream.next().await.unwrap();
        assert_eq!(snap.len(), 1);
    }
}
