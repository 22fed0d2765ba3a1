//! Alarms.
//!
//! Setting alarms always takes two writes to the same handle: the primary
//! alarm first, then the secondary alarms. The second write starts only
//! after the first has been acknowledged.

use async_trait::async_trait;
use gshock_protocol::{
    decode_alarms, encode_alarm_primary, encode_alarm_secondary, Alarm, CASIO_SETTING_FOR_ALM,
};
use serde_json::Value;
use tracing::trace;

use super::{message_value, Dispatched, Feature, Received};
use crate::connection::{Connection, Handles};
use crate::error::{LinkError, LinkResult};
use crate::types::{FeatureId, FeatureValue};

/// Alarms feature.
#[derive(Debug, Clone)]
pub struct AlarmsFeature {
    handles: Handles,
}

impl AlarmsFeature {
    /// Create the feature.
    pub fn new(handles: Handles) -> Self {
        AlarmsFeature { handles }
    }
}

#[async_trait]
impl Feature for AlarmsFeature {
    fn id(&self) -> FeatureId {
        FeatureId::Alarms
    }

    async fn send_to_watch(&self, conn: &dyn Connection, _message: &Value) -> LinkResult<Dispatched> {
        conn.write(self.handles.read_request, &[CASIO_SETTING_FOR_ALM]).await?;
        Ok(Dispatched::Sent)
    }

    async fn send_to_watch_set(&self, conn: &dyn Connection, message: &Value) -> LinkResult<Dispatched> {
        let alarms: Vec<Alarm> = serde_json::from_value(message_value(message).clone())
            .map_err(|e| LinkError::InvalidMessage(format!("expected an alarm array: {}", e)))?;

        // Encode both frames before writing anything so a bad entry leaves
        // the watch untouched.
        let primary = encode_alarm_primary(&alarms)?;
        let secondary = encode_alarm_secondary(&alarms)?;

        trace!("writing {} alarm(s)", alarms.len());
        conn.write(self.handles.all_features, &primary).await?;
        // A lone primary still writes the bare secondary tag, clearing the
        // secondary alarms on the watch.
        conn.write(self.handles.all_features, &secondary).await?;
        Ok(Dispatched::Sent)
    }

    fn on_received(&self, frame: &[u8]) -> LinkResult<Received> {
        let alarms = decode_alarms(frame)?;
        Ok(Received::Passive(Some(FeatureValue::Alarms(alarms))))
    }
}
