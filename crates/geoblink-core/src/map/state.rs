// ── Map state machine ──
//
// State, events, effects, and the pure reducer for the map screen.
// The reducer is a total function: every event maps to exactly one new
// state, with effects collected as a side output. Replaying the same
// event sequence from the same initial state always yields the same
// final state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{Coordinates, Device};

/// Message carried by the search-miss `ShowError` effect.
pub(crate) const DEVICE_NOT_FOUND: &str = "device not found";

// ── State ───────────────────────────────────────────────────────────

/// Map tile theme.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum MapTheme {
    #[default]
    Standard,
    Satellite,
    Dark,
}

/// Everything the map screen shows.
///
/// `devices` holds only mappable devices -- the store keeps the full
/// cache, this is the filtered view reconstructed on every emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub devices: Vec<Arc<Device>>,
    pub selected: Option<Arc<Device>>,
    pub user_location: Option<Coordinates>,
    pub follow_mode: bool,
    pub theme: MapTheme,
    pub loading: bool,
    pub error: Option<String>,
}

// ── Events & effects ────────────────────────────────────────────────

/// What the user (or the outer shell) does.
#[derive(Debug, Clone)]
pub enum MapEvent {
    DeviceSelected(Option<Arc<Device>>),
    UserLocationUpdated { lat: f64, lng: f64 },
    ThemeChanged(MapTheme),
    SearchDevice(String),
    FollowModeToggle,
    RefreshDevices,
}

/// One-shot instructions for the outer consumer (camera, toasts).
#[derive(Debug, Clone, PartialEq)]
pub enum MapEffect {
    ZoomToDevice(Arc<Device>),
    ShowError(String),
}

// ── Reducer ─────────────────────────────────────────────────────────

/// Pure transform: `(state, event) -> (state, effects)`.
///
/// Expected domain conditions (search miss, refresh-while-loading) are
/// modeled in the returned state/effects, never as errors.
pub fn reduce(state: &MapState, event: MapEvent) -> (MapState, Vec<MapEffect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        MapEvent::DeviceSelected(device) => {
            next.selected.clone_from(&device);
            if let Some(device) = device {
                if device.is_mappable() {
                    effects.push(MapEffect::ZoomToDevice(device));
                }
            }
        }

        MapEvent::UserLocationUpdated { lat, lng } => {
            next.user_location = Some(Coordinates::new(lat, lng));
        }

        MapEvent::ThemeChanged(theme) => {
            next.theme = theme;
        }

        MapEvent::SearchDevice(query) => match find_device(&state.devices, &query) {
            Some(found) => {
                next.selected = Some(Arc::clone(found));
                effects.push(MapEffect::ZoomToDevice(Arc::clone(found)));
            }
            None => effects.push(MapEffect::ShowError(DEVICE_NOT_FOUND.into())),
        },

        MapEvent::FollowModeToggle => {
            next.follow_mode = !state.follow_mode;
            if next.follow_mode {
                if let Some(selected) = next.selected.as_ref().filter(|d| d.is_mappable()) {
                    effects.push(MapEffect::ZoomToDevice(Arc::clone(selected)));
                }
            }
        }

        MapEvent::RefreshDevices => {
            // Non-reentrant: a refresh request while one is in flight is
            // a no-op. The controller starts a sync cycle only when this
            // transition actually flips the flag.
            if !state.loading {
                next.loading = true;
            }
        }
    }

    (next, effects)
}

/// First match wins, in list order: case-insensitive substring on name,
/// exact substring on IMEI, case-insensitive substring on plate.
fn find_device<'a>(devices: &'a [Arc<Device>], query: &str) -> Option<&'a Arc<Device>> {
    let needle = query.to_lowercase();
    devices.iter().find(|d| {
        d.name.to_lowercase().contains(&needle)
            || d.imei.as_str().contains(query)
            || d.registration_plate.to_lowercase().contains(&needle)
    })
}
