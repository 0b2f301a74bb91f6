// geoblink-core: Reactive data layer between geoblink-api and consumers (CLI).

pub mod container;
pub mod convert;
pub mod error;
pub mod map;
pub mod model;
pub mod session;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use container::{EffectSubscription, StateContainer};
pub use error::CoreError;
pub use map::{MapController, MapEffect, MapEvent, MapState, MapTheme};
pub use session::{AuthTokens, SessionManager};
pub use store::{DeviceStore, DeviceStream};
pub use sync::{DeviceSource, DeviceSync};

// Re-export model types at the crate root for ergonomics.
pub use model::{Coordinates, Device, Imei, NotificationItem};
