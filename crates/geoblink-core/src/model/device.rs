// ── Device domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Imei ────────────────────────────────────────────────────────────

/// Device identity: the tracker's IMEI.
///
/// Kept as a string -- some platforms pad or prefix the value, and we
/// never do arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Imei(String);

impl Imei {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Imei {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Imei {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Coordinates ─────────────────────────────────────────────────────

/// A geographic position as last reported by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether this position can be placed on a map.
    ///
    /// Trackers occasionally report out-of-range fixes (lat 91, lng 200);
    /// those stay in the cache but are never mapped. Bounds are inclusive,
    /// so (0, 0) is a valid position like any other.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// The canonical tracker device type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub imei: Imei,
    pub name: String,
    /// Last known position; `None` until the device reports a fix.
    pub position: Option<Coordinates>,
    /// Vehicle registration plate, free-form text.
    pub registration_plate: String,
    pub online: bool,
    /// Battery charge percentage, if the device reports one.
    pub battery_pct: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    /// Whether the device has a position worth putting on the map.
    pub fn is_mappable(&self) -> bool {
        self.position.is_some_and(|p| p.is_valid())
    }
}
