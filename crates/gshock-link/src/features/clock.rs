//! Current time.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use gshock_protocol::{encode_current_time, parse_local_timestamp};
use serde_json::Value;
use tracing::debug;

use super::{message_value, Dispatched, Feature};
use crate::connection::{Connection, Handles};
use crate::error::{LinkError, LinkResult};
use crate::types::FeatureId;

/// Sets the watch clock.
#[derive(Debug, Clone)]
pub struct ClockFeature {
    handles: Handles,
}

impl ClockFeature {
    /// Create the feature.
    pub fn new(handles: Handles) -> Self {
        ClockFeature { handles }
    }
}

/// The time a set-time message asks for; a missing value or `"now"` means
/// the host's local time.
fn requested_time(value: &Value) -> LinkResult<NaiveDateTime> {
    match value {
        Value::Null => Ok(Local::now().naive_local()),
        Value::String(s) if s.eq_ignore_ascii_case("now") => Ok(Local::now().naive_local()),
        Value::String(s) => Ok(parse_local_timestamp(s)?),
        other => Err(LinkError::InvalidMessage(format!(
            "expected a timestamp string, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Feature for ClockFeature {
    fn id(&self) -> FeatureId {
        FeatureId::Time
    }

    async fn send_to_watch_set(&self, conn: &dyn Connection, message: &Value) -> LinkResult<Dispatched> {
        let time = requested_time(message_value(message))?;
        let frame = encode_current_time(&time)?;
        debug!("setting watch time to {}", time);
        conn.write(self.handles.all_features, &frame).await?;
        Ok(Dispatched::Sent)
    }
}
