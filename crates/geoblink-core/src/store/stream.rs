// ── Live device view ──
//
// Subscription handle for consuming device-cache changes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Device;

type Snapshot = Arc<Vec<Arc<Device>>>;

/// A subscription to the device cache.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via `changed()`.
pub struct DeviceStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl DeviceStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time or by the last `changed()`.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Whether an emission is pending that `changed()` hasn't consumed.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped -- the live feed
    /// terminating is the subscription-failure case consumers must handle.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
