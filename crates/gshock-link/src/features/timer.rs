//! Countdown timer: the correlating feature.
//!
//! `GET_TIMER` issues a read request and registers a pending correlation;
//! the timer frame that comes back through [`Feature::on_received`] resolves
//! it. A timer frame with nothing pending is an ordinary notification.

use async_trait::async_trait;
use gshock_protocol::{decode_timer, encode_timer, CASIO_TIMER};
use serde_json::Value;
use tracing::{debug, trace};

use super::{message_value, Dispatched, Feature, Received};
use crate::connection::{Connection, Handles};
use crate::error::{LinkError, LinkResult};
use crate::registry::{CompletionHandle, CorrelationState, PendingRegistry};
use crate::types::{FeatureId, FeatureValue};

/// Countdown timer feature.
#[derive(Debug, Clone)]
pub struct TimerFeature {
    handles: Handles,
    registry: PendingRegistry,
}

impl TimerFeature {
    /// Create the feature over a shared registry.
    pub fn new(handles: Handles, registry: PendingRegistry) -> Self {
        TimerFeature { handles, registry }
    }

    /// Whether a timer read is outstanding.
    pub fn state(&self) -> CorrelationState {
        self.registry.state(FeatureId::Timer)
    }

    /// Ask the watch for its timer setting.
    ///
    /// Only legal while idle: a second call before the first is resolved
    /// fails with [`LinkError::AlreadyPending`] and issues nothing.
    pub async fn request(&self, conn: &dyn Connection) -> LinkResult<CompletionHandle> {
        let handle = self.registry.register(FeatureId::Timer)?;
        debug!("requesting timer (token {})", handle.token());

        // On failure the handle is dropped, which withdraws only its own
        // registration.
        if let Err(e) = conn.request(CASIO_TIMER).await {
            debug!("timer read request failed (token {}): {}", handle.token(), e);
            return Err(e.into());
        }
        Ok(handle)
    }
}

/// Seconds from a number or a numeric string.
fn seconds_from(value: &Value) -> LinkResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| LinkError::InvalidMessage(format!("timer seconds not an integer: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| LinkError::InvalidMessage(format!("timer seconds not an integer: '{}'", s))),
        other => Err(LinkError::InvalidMessage(format!(
            "expected timer seconds, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Feature for TimerFeature {
    fn id(&self) -> FeatureId {
        FeatureId::Timer
    }

    fn correlates(&self) -> bool {
        true
    }

    async fn send_to_watch(&self, conn: &dyn Connection, _message: &Value) -> LinkResult<Dispatched> {
        self.request(conn).await.map(Dispatched::Pending)
    }

    async fn send_to_watch_set(&self, conn: &dyn Connection, message: &Value) -> LinkResult<Dispatched> {
        let seconds = seconds_from(message_value(message))?;
        let frame = encode_timer(seconds)?;
        trace!("setting timer to {}s", seconds);
        conn.write(self.handles.all_features, &frame).await?;
        Ok(Dispatched::Sent)
    }

    fn on_received(&self, frame: &[u8]) -> LinkResult<Received> {
        let value = FeatureValue::TimerSeconds(decode_timer(frame)?);
        if self.registry.resolve(FeatureId::Timer, value.clone()) {
            Ok(Received::Resolved)
        } else {
            Ok(Received::Passive(Some(value)))
        }
    }
}
