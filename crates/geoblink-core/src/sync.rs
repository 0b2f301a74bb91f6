// ── Device synchronization ──
//
// One fetch-and-reconcile cycle against the remote platform. The store
// is only written after the full remote set has been fetched and
// converted, so a failed or cancelled cycle never leaves a half-written
// cache behind. Retry policy belongs to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use geoblink_api::TrackerClient;

use crate::error::CoreError;
use crate::model::Device;
use crate::session::{AuthTokens, SessionManager};
use crate::store::DeviceStore;

/// Seam over the remote device source, so the sync cycle (and its tests)
/// don't depend on HTTP.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn fetch_devices(&self, tokens: &AuthTokens) -> Result<Vec<Device>, CoreError>;
}

#[async_trait]
impl DeviceSource for TrackerClient {
    async fn fetch_devices(&self, tokens: &AuthTokens) -> Result<Vec<Device>, CoreError> {
        let trackers = self.list_trackers(&tokens.token, &tokens.hash).await?;
        Ok(trackers.into_iter().map(Device::from).collect())
    }
}

/// Performs one remote fetch-reconcile cycle against the device store.
pub struct DeviceSync {
    source: Arc<dyn DeviceSource>,
    store: Arc<DeviceStore>,
    session: Arc<SessionManager>,
}

impl DeviceSync {
    pub fn new(
        source: Arc<dyn DeviceSource>,
        store: Arc<DeviceStore>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            source,
            store,
            session,
        }
    }

    /// Run exactly one sync cycle.
    ///
    /// Either the full reconciled set is committed to the store or
    /// nothing is. Does not retry; callers decide whether and when to
    /// call again.
    pub async fn execute(&self) -> Result<(), CoreError> {
        let tokens = self.session.tokens().ok_or(CoreError::NotAuthenticated)?;

        let devices = self.source.fetch_devices(&tokens).await?;

        // Single atomic commit; subscribers get one re-emission.
        let count = devices.len();
        self.store.replace_all(devices);
        debug!(devices = count, "device sync complete");
        Ok(())
    }
}
