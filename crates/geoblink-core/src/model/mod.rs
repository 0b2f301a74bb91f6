// ── Unified domain model ──
//
// Every type in this module is the canonical representation of a tracker
// platform entity, decoupled from the wire shapes in geoblink-api.
// Consumers (controller, CLI) depend only on these.

pub mod device;
pub mod notification;

pub use device::{Coordinates, Device, Imei};
pub use notification::NotificationItem;
