// ── Map feature ──
//
// The map screen's state machine: a pure reducer over map events plus a
// controller that wires it to the device store and the sync cycle.

mod controller;
mod state;

pub use controller::MapController;
pub use state::{MapEffect, MapEvent, MapState, MapTheme, reduce};
