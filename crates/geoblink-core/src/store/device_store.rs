// ── Reactive device store ──
//
// Thread-safe storage for the device cache. Mutations are broadcast to
// subscribers via a `watch` channel carrying full snapshots.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::watch;

use super::stream::DeviceStream;
use crate::model::{Device, Imei};

/// The local device cache with a live, push-updated read view.
///
/// Lookups are lock-free via `DashMap`; writers serialize through an
/// internal mutex so concurrent sync and local-edit writes can never
/// interleave into a torn snapshot. Every mutation rebuilds the snapshot
/// that subscribers receive -- including devices with invalid coordinates,
/// which are retained here and filtered at the map layer.
pub struct DeviceStore {
    by_imei: DashMap<Imei, Arc<Device>>,
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
    write_gate: Mutex<()>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_imei: DashMap::new(),
            snapshot,
            write_gate: Mutex::new(()),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Look up a device by IMEI.
    pub fn get(&self, imei: &Imei) -> Option<Arc<Device>> {
        self.by_imei.get(imei).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone), sorted by IMEI.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.by_imei.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_imei.is_empty()
    }

    /// Subscribe to the live view. Re-emits on every insert, update, or
    /// removal, regardless of which writer caused it.
    pub fn subscribe(&self) -> DeviceStream {
        DeviceStream::new(self.snapshot.subscribe())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert or update a single device. Returns `true` if the IMEI was new.
    pub fn upsert(&self, device: Device) -> bool {
        let _guard = self.lock_writes();
        let is_new = self
            .by_imei
            .insert(device.imei.clone(), Arc::new(device))
            .is_none();
        self.rebuild_snapshot();
        is_new
    }

    /// Remove a device. Returns the removed record if it existed.
    pub fn remove(&self, imei: &Imei) -> Option<Arc<Device>> {
        let _guard = self.lock_writes();
        let removed = self.by_imei.remove(imei).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Reconciliation commit: replace the whole cache with a freshly
    /// fetched device set in one atomic step. Subscribers observe either
    /// the old set or the new one -- never a partially applied mix --
    /// and exactly one re-emission happens per call.
    pub fn replace_all(&self, devices: Vec<Device>) {
        let _guard = self.lock_writes();
        self.by_imei.clear();
        for device in devices {
            self.by_imei.insert(device.imei.clone(), Arc::new(device));
        }
        self.rebuild_snapshot();
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_gate
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    /// Sorted by IMEI so the ordering is stable across rebuilds.
    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<Device>> =
            self.by_imei.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.imei.as_str().cmp(b.imei.as_str()));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}
