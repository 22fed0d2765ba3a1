//! Feature handlers.
//!
//! Every protocol feature has the same three-operation shape: a "get"-style
//! [`send_to_watch`](Feature::send_to_watch), a "set"-style
//! [`send_to_watch_set`](Feature::send_to_watch_set) and an inbound
//! [`on_received`](Feature::on_received). Features implement the subset the
//! watch supports; the defaults report [`LinkError::Unsupported`] for sends
//! and hand inbound frames on as undecoded notifications.

mod alarms;
mod clock;
mod tagged;
mod timer;
mod watch_name;

pub use alarms::AlarmsFeature;
pub use clock::ClockFeature;
pub use tagged::{Decoder, TaggedFeature};
pub use timer::TimerFeature;
pub use watch_name::WatchNameFeature;

use async_trait::async_trait;
use serde_json::Value;

use crate::connection::Connection;
use crate::error::{LinkError, LinkResult};
use crate::registry::CompletionHandle;
use crate::types::{FeatureId, FeatureValue};

/// Outcome of sending an action to the watch.
#[derive(Debug)]
pub enum Dispatched {
    /// The write was acknowledged; nothing more will follow.
    Sent,
    /// A read request was issued; the reply resolves this handle.
    Pending(CompletionHandle),
}

impl Dispatched {
    /// The completion handle, if the action started a correlated request.
    pub fn into_pending(self) -> Option<CompletionHandle> {
        match self {
            Dispatched::Pending(handle) => Some(handle),
            Dispatched::Sent => None,
        }
    }
}

/// What a feature did with an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// The frame answered a pending request and was delivered to its caller.
    Resolved,
    /// Nobody asked for it; surface it as a passive state update.
    Passive(Option<FeatureValue>),
}

/// One protocol feature.
#[async_trait]
pub trait Feature: Send + Sync {
    /// Identity of this feature.
    fn id(&self) -> FeatureId;

    /// Whether [`send_to_watch`](Self::send_to_watch) starts a correlated
    /// request answered by a later inbound frame.
    fn correlates(&self) -> bool {
        false
    }

    /// "Get"-style request.
    async fn send_to_watch(&self, _conn: &dyn Connection, _message: &Value) -> LinkResult<Dispatched> {
        Err(LinkError::Unsupported {
            feature: self.id(),
            operation: "send_to_watch",
        })
    }

    /// "Set"-style request.
    async fn send_to_watch_set(
        &self,
        _conn: &dyn Connection,
        _message: &Value,
    ) -> LinkResult<Dispatched> {
        Err(LinkError::Unsupported {
            feature: self.id(),
            operation: "send_to_watch_set",
        })
    }

    /// Handle an inbound frame, tag byte included.
    fn on_received(&self, _frame: &[u8]) -> LinkResult<Received> {
        Ok(Received::Passive(None))
    }
}

/// The value an action operates on.
///
/// Application messages look like `{"action": "SET_TIMER", "value": 150}`;
/// a bare value is accepted as well.
pub(crate) fn message_value(message: &Value) -> &Value {
    match message {
        Value::Object(map) => map.get("value").unwrap_or(&Value::Null),
        other => other,
    }
}

/// Read a byte array, or a list of byte arrays, from a message value.
pub(crate) fn byte_payloads(value: &Value) -> LinkResult<Vec<Vec<u8>>> {
    let invalid = |e: serde_json::Error| LinkError::InvalidMessage(format!("expected bytes: {}", e));
    match value {
        Value::Array(items) if items.iter().all(Value::is_array) => {
            serde_json::from_value(value.clone()).map_err(invalid)
        }
        Value::Array(_) => Ok(vec![serde_json::from_value(value.clone()).map_err(invalid)?]),
        other => Err(LinkError::InvalidMessage(format!(
            "expected a byte array, got {}",
            other
        ))),
    }
}
