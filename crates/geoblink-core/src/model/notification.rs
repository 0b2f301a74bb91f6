// ── Notification feed types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::Imei;

/// One entry in the per-account notification feed (geofence exits,
/// low battery, offline alerts -- the kind string is platform-defined
/// and opaque to this crate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub imei: Imei,
    pub time: DateTime<Utc>,
    pub kind: String,
}
