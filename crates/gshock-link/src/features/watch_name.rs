//! Watch name, read through the same correlation mechanism as the timer.

use async_trait::async_trait;
use gshock_protocol::{decode_watch_name, CASIO_WATCH_NAME};
use serde_json::Value;
use tracing::debug;

use super::{Dispatched, Feature, Received};
use crate::connection::Connection;
use crate::error::LinkResult;
use crate::registry::{CompletionHandle, PendingRegistry};
use crate::types::{FeatureId, FeatureValue};

/// Watch name feature.
#[derive(Debug, Clone)]
pub struct WatchNameFeature {
    registry: PendingRegistry,
}

impl WatchNameFeature {
    /// Create the feature over a shared registry.
    pub fn new(registry: PendingRegistry) -> Self {
        WatchNameFeature { registry }
    }

    /// Ask the watch for its model name.
    pub async fn request(&self, conn: &dyn Connection) -> LinkResult<CompletionHandle> {
        let handle = self.registry.register(FeatureId::WatchName)?;
        debug!("requesting watch name (token {})", handle.token());

        if let Err(e) = conn.request(CASIO_WATCH_NAME).await {
            debug!("watch name read request failed (token {}): {}", handle.token(), e);
            return Err(e.into());
        }
        Ok(handle)
    }
}

#[async_trait]
impl Feature for WatchNameFeature {
    fn id(&self) -> FeatureId {
        FeatureId::WatchName
    }

    fn correlates(&self) -> bool {
        true
    }

    async fn send_to_watch(&self, conn: &dyn Connection, _message: &Value) -> LinkResult<Dispatched> {
        self.request(conn).await.map(Dispatched::Pending)
    }

    fn on_received(&self, frame: &[u8]) -> LinkResult<Received> {
        let value = FeatureValue::WatchName(decode_watch_name(frame)?);
        if self.registry.resolve(FeatureId::WatchName, value.clone()) {
            Ok(Received::Resolved)
        } else {
            Ok(Received::Passive(Some(value)))
        }
    }
}
