// ── Map controller ──
//
// Owns a StateContainer for the map screen and wires it to the device
// store's live view and the sync cycle. All state mutations go through
// the pure reducer or an atomic `update`; suspension happens only at the
// store subscription and the remote sync call.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::container::{EffectSubscription, StateContainer};
use crate::error::CoreError;
use crate::model::Device;
use crate::store::{DeviceStore, DeviceStream};
use crate::sync::DeviceSync;

use super::state::{MapEffect, MapEvent, MapState, reduce};

const DEVICE_FEED_CLOSED: &str = "device feed closed";

/// Controller for the map screen.
///
/// Construction subscribes to the store's live device view; the first
/// emission clears `loading`. Dispatch applies the reducer atomically
/// and emits effects in order. Tear down with [`shutdown()`](Self::shutdown).
pub struct MapController {
    container: Arc<StateContainer<MapState, MapEffect>>,
    sync: Arc<DeviceSync>,
    cancel: CancellationToken,
    feed_task: Mutex<Option<JoinHandle<()>>>,
}

impl MapController {
    pub fn new(store: &DeviceStore, sync: Arc<DeviceSync>) -> Self {
        let container = Arc::new(StateContainer::new(MapState {
            loading: true,
            ..MapState::default()
        }));
        let cancel = CancellationToken::new();

        let feed_task = tokio::spawn(device_feed_task(
            Arc::clone(&container),
            store.subscribe(),
            cancel.clone(),
        ));

        Self {
            container,
            sync,
            cancel,
            feed_task: Mutex::new(Some(feed_task)),
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<MapState> {
        self.container.watch()
    }

    /// Read the current state (never blocks).
    pub fn current_state(&self) -> MapState {
        self.container.current()
    }

    /// Attach the single effect consumer (camera moves, toasts).
    pub fn subscribe_effects(&self) -> Option<EffectSubscription<MapEffect>> {
        self.container.subscribe_effects()
    }

    // ── Event handling ───────────────────────────────────────────────

    /// Handle one map event.
    ///
    /// Synchronous events return after the atomic state transition;
    /// `RefreshDevices` additionally awaits the sync cycle, clears
    /// `loading`, and surfaces a failure as a `ShowError` effect. The
    /// device list itself only changes through the store re-emission the
    /// sync write triggers. A refresh dispatched while one is in flight
    /// is ignored.
    pub async fn dispatch(&self, event: MapEvent) {
        let is_refresh = matches!(event, MapEvent::RefreshDevices);
        let mut effects = Vec::new();
        let mut started_refresh = false;

        self.container.update(|state| {
            started_refresh = is_refresh && !state.loading;
            let (next, fx) = reduce(state, event);
            *state = next;
            effects = fx;
        });

        for effect in effects {
            self.container.emit(effect);
        }

        if started_refresh {
            self.run_refresh().await;
        }
    }

    async fn run_refresh(&self) {
        debug!("starting device refresh");
        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return,
            outcome = self.sync.execute() => outcome,
        };

        self.container.update(|state| state.loading = false);

        if let Err(err) = outcome {
            self.container
                .emit(MapEffect::ShowError(failure_reason(err)));
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Cancel the store subscription and any in-flight sync, then wait
    /// for the feed task to finish. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.feed_task.lock().await.take() {
            let _ = handle.await;
        }
        debug!("map controller shut down");
    }
}

/// Forward store emissions into the controller's state, filtered to
/// mappable devices. The feed terminating (store dropped) is surfaced as
/// both `error` state and a `ShowError` effect; there is no automatic
/// resubscribe.
async fn device_feed_task(
    container: Arc<StateContainer<MapState, MapEffect>>,
    mut stream: DeviceStream,
    cancel: CancellationToken,
) {
    apply_snapshot(&container, stream.current());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            snapshot = stream.changed() => match snapshot {
                Some(snapshot) => apply_snapshot(&container, &snapshot),
                None => {
                    container.update(|state| {
                        state.loading = false;
                        state.error = Some(DEVICE_FEED_CLOSED.into());
                    });
                    container.emit(MapEffect::ShowError(DEVICE_FEED_CLOSED.into()));
                    break;
                }
            }
        }
    }
}

fn apply_snapshot(
    container: &StateContainer<MapState, MapEffect>,
    snapshot: &Arc<Vec<Arc<Device>>>,
) {
    let mappable: Vec<Arc<Device>> = snapshot
        .iter()
        .filter(|d| d.is_mappable())
        .map(Arc::clone)
        .collect();
    container.update(|state| {
        state.devices = mappable;
        state.loading = false;
    });
}

/// Strip the `SyncFailed` prefix so toasts show the bare reason.
fn failure_reason(err: CoreError) -> String {
    match err {
        CoreError::SyncFailed { message } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, Imei};
    use crate::session::{AuthTokens, SessionManager};
    use crate::sync::DeviceSource;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct NeverSource;

    #[async_trait]
    impl DeviceSource for NeverSource {
        async fn fetch_devices(&self, _tokens: &AuthTokens) -> Result<Vec<Device>, CoreError> {
            Err(CoreError::Internal("unexpected fetch".into()))
        }
    }

    struct FailingSource(&'static str);

    #[async_trait]
    impl DeviceSource for FailingSource {
        async fn fetch_devices(&self, _tokens: &AuthTokens) -> Result<Vec<Device>, CoreError> {
            Err(CoreError::SyncFailed {
                message: self.0.into(),
            })
        }
    }

    struct FixedSource(Vec<Device>);

    #[async_trait]
    impl DeviceSource for FixedSource {
        async fn fetch_devices(&self, _tokens: &AuthTokens) -> Result<Vec<Device>, CoreError> {
            Ok(self.0.clone())
        }
    }

    fn device(imei: &str, name: &str, lat: f64, lng: f64) -> Device {
        Device {
            imei: Imei::from(imei),
            name: name.into(),
            position: Some(Coordinates::new(lat, lng)),
            registration_plate: String::new(),
            online: true,
            battery_pct: None,
            last_seen: None,
        }
    }

    fn controller_with(
        store: &Arc<DeviceStore>,
        source: Arc<dyn DeviceSource>,
    ) -> MapController {
        let session = Arc::new(SessionManager::with_tokens(AuthTokens::new("tok", "hash")));
        let sync = Arc::new(DeviceSync::new(source, Arc::clone(store), session));
        MapController::new(store, sync)
    }

    async fn settled_state(controller: &MapController) -> MapState {
        let mut rx = controller.state();
        rx.wait_for(|s| !s.loading).await.unwrap().clone()
    }

    #[tokio::test]
    async fn invalid_coordinates_are_excluded_from_map_state() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("A", "Ghost", 91.0, 0.0));
        store.upsert(device("B", "Truck", 10.0, 20.0));

        let controller = controller_with(&store, Arc::new(NeverSource));
        let state = settled_state(&controller).await;

        let imeis: Vec<&str> = state.devices.iter().map(|d| d.imei.as_str()).collect();
        assert_eq!(imeis, ["B"]);
        assert!(state.error.is_none());

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn first_emission_clears_loading() {
        let store = Arc::new(DeviceStore::new());
        let controller = controller_with(&store, Arc::new(NeverSource));

        let state = settled_state(&controller).await;
        assert!(!state.loading);
        assert!(state.devices.is_empty());

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn search_hit_selects_and_zooms() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("A", "Ghost", 91.0, 0.0));
        store.upsert(device("B", "Truck", 10.0, 20.0));

        let controller = controller_with(&store, Arc::new(NeverSource));
        settled_state(&controller).await;
        let mut effects = controller.subscribe_effects().unwrap();

        controller
            .dispatch(MapEvent::SearchDevice("truck".into()))
            .await;

        let state = controller.current_state();
        assert_eq!(state.selected.as_ref().unwrap().imei, Imei::from("B"));
        match effects.try_recv().unwrap() {
            MapEffect::ZoomToDevice(d) => assert_eq!(d.imei, Imei::from("B")),
            other => panic!("unexpected effect: {other:?}"),
        }

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn search_miss_shows_error_and_keeps_state() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("B", "Truck", 10.0, 20.0));

        let controller = controller_with(&store, Arc::new(NeverSource));
        let before = settled_state(&controller).await;
        let mut effects = controller.subscribe_effects().unwrap();

        controller
            .dispatch(MapEvent::SearchDevice("zzz".into()))
            .await;

        assert_eq!(controller.current_state(), before);
        assert_eq!(
            effects.try_recv(),
            Some(MapEffect::ShowError("device not found".into()))
        );

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn failed_refresh_resets_loading_and_shows_error() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("B", "Truck", 10.0, 20.0));

        let controller = controller_with(&store, Arc::new(FailingSource("auth expired")));
        let before = settled_state(&controller).await;
        let mut effects = controller.subscribe_effects().unwrap();

        controller.dispatch(MapEvent::RefreshDevices).await;

        let state = controller.current_state();
        assert!(!state.loading);
        assert_eq!(state.devices, before.devices);
        assert_eq!(
            effects.try_recv(),
            Some(MapEffect::ShowError("auth expired".into()))
        );

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn successful_refresh_updates_devices_through_the_store() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("old", "Old", 1.0, 1.0));

        let fresh = vec![device("new", "New", 2.0, 2.0)];
        let controller = controller_with(&store, Arc::new(FixedSource(fresh)));
        settled_state(&controller).await;

        let mut rx = controller.state();
        controller.dispatch(MapEvent::RefreshDevices).await;

        let state = rx
            .wait_for(|s| !s.loading && s.devices.iter().any(|d| d.imei == Imei::from("new")))
            .await
            .unwrap()
            .clone();
        assert_eq!(state.devices.len(), 1);

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn effects_arrive_in_dispatch_order() {
        let store = Arc::new(DeviceStore::new());
        store.upsert(device("A", "Alpha", 1.0, 1.0));
        store.upsert(device("B", "Beta", 2.0, 2.0));

        let controller = controller_with(&store, Arc::new(NeverSource));
        settled_state(&controller).await;
        let mut effects = controller.subscribe_effects().unwrap();

        controller
            .dispatch(MapEvent::SearchDevice("alpha".into()))
            .await;
        controller
            .dispatch(MapEvent::SearchDevice("beta".into()))
            .await;

        match (effects.try_recv().unwrap(), effects.try_recv().unwrap()) {
            (MapEffect::ZoomToDevice(first), MapEffect::ZoomToDevice(second)) => {
                assert_eq!(first.imei, Imei::from("A"));
                assert_eq!(second.imei, Imei::from("B"));
            }
            other => panic!("unexpected effects: {other:?}"),
        }

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn store_drop_surfaces_feed_error() {
        // Subscribe the feed to a store the sync path does not keep alive.
        let feed_store = DeviceStore::new();
        let sync_store = Arc::new(DeviceStore::new());
        let session = Arc::new(SessionManager::with_tokens(AuthTokens::new("tok", "hash")));
        let sync = Arc::new(DeviceSync::new(Arc::new(NeverSource), sync_store, session));

        let controller = MapController::new(&feed_store, sync);
        settled_state(&controller).await;
        let mut effects = controller.subscribe_effects().unwrap();

        drop(feed_store);

        let mut rx = controller.state();
        let state = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();
        assert_eq!(state.error.as_deref(), Some(DEVICE_FEED_CLOSED));
        assert!(!state.loading);
        assert_eq!(
            effects.recv().await,
            Some(MapEffect::ShowError(DEVICE_FEED_CLOSED.into()))
        );

        controller.shutdown().await;
    }
}
