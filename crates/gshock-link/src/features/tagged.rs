//! Features whose payloads are opaque to the link.
//!
//! Settings, time adjustment, reminders and the purely observational
//! features share one shape: an optional single-byte "get" request, an
//! optional set of tags they accept pre-encoded frames for, and an optional
//! decoder for inbound frames. The byte layouts behind those tags belong to
//! their own codecs; the link checks only the leading tag.

use async_trait::async_trait;
use gshock_protocol::{characteristic_name, ProtocolError, ProtocolResult, UNKNOWN};
use serde_json::Value;
use tracing::{debug, trace};

use super::{byte_payloads, message_value, Dispatched, Feature, Received};
use crate::connection::{Connection, Handles};
use crate::error::{LinkError, LinkResult};
use crate::types::{FeatureId, FeatureValue};

/// Decoder for a feature's inbound frames.
pub type Decoder = fn(&[u8]) -> ProtocolResult<Option<FeatureValue>>;

/// A feature assembled from tags.
#[derive(Debug, Clone)]
pub struct TaggedFeature {
    id: FeatureId,
    handles: Handles,
    request_tag: Option<u8>,
    write_tags: &'static [u8],
    decoder: Option<Decoder>,
}

impl TaggedFeature {
    /// A feature that only observes inbound frames.
    pub fn new(id: FeatureId, handles: Handles) -> Self {
        TaggedFeature {
            id,
            handles,
            request_tag: None,
            write_tags: &[],
            decoder: None,
        }
    }

    /// Support "get" by writing `tag` to the read-request handle.
    pub fn with_request(mut self, tag: u8) -> Self {
        self.request_tag = Some(tag);
        self
    }

    /// Support "set" with pre-encoded frames starting with one of `tags`.
    pub fn with_writes(mut self, tags: &'static [u8]) -> Self {
        self.write_tags = tags;
        self
    }

    /// Decode inbound frames with `decoder`.
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    fn check_tag(&self, frame: &[u8]) -> LinkResult<()> {
        match frame.first() {
            Some(tag) if self.write_tags.contains(tag) => Ok(()),
            Some(&tag) => {
                debug!(
                    "{} does not accept frames tagged 0x{:02X} ({})",
                    self.id,
                    tag,
                    characteristic_name(tag).unwrap_or("unknown")
                );
                Err(ProtocolError::UnexpectedTag {
                    expected: self.write_tags.first().copied().unwrap_or(UNKNOWN),
                    actual: tag,
                }
                .into())
            }
            None => Err(LinkError::InvalidMessage(format!(
                "empty {} frame",
                self.id
            ))),
        }
    }
}

#[async_trait]
impl Feature for TaggedFeature {
    fn id(&self) -> FeatureId {
        self.id
    }

    async fn send_to_watch(&self, conn: &dyn Connection, _message: &Value) -> LinkResult<Dispatched> {
        let tag = self.request_tag.ok_or(LinkError::Unsupported {
            feature: self.id,
            operation: "send_to_watch",
        })?;
        trace!("requesting {} (tag 0x{:02X})", self.id, tag);
        conn.write(self.handles.read_request, &[tag]).await?;
        Ok(Dispatched::Sent)
    }

    async fn send_to_watch_set(&self, conn: &dyn Connection, message: &Value) -> LinkResult<Dispatched> {
        if self.write_tags.is_empty() {
            return Err(LinkError::Unsupported {
                feature: self.id,
                operation: "send_to_watch_set",
            });
        }

        let frames = byte_payloads(message_value(message))?;
        if frames.is_empty() {
            return Err(LinkError::InvalidMessage(format!("no {} frames to write", self.id)));
        }
        for frame in &frames {
            self.check_tag(frame)?;
        }

        debug!("writing {} {} frame(s)", frames.len(), self.id);
        for frame in &frames {
            conn.write(self.handles.all_features, frame).await?;
        }
        Ok(Dispatched::Sent)
    }

    fn on_received(&self, frame: &[u8]) -> LinkResult<Received> {
        let value = match self.decoder {
            Some(decode) => decode(frame)?,
            None => None,
        };
        Ok(Received::Passive(value))
    }
}
