//! Common types used in the protocol.

use serde::{Deserialize, Serialize};

use crate::constants::characteristic_name;

/// A raw frame as it travels over the all-features characteristic.
///
/// The first byte is the feature tag; everything after it is the
/// feature-specific payload. There is no length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireMessage(Vec<u8>);

impl WireMessage {
    /// Wrap raw frame bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        WireMessage(bytes)
    }

    /// Copy a frame out of a borrowed slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        WireMessage(bytes.to_vec())
    }

    /// The leading feature tag, or `None` for an empty frame.
    pub fn tag(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// Bytes after the tag.
    pub fn payload(&self) -> &[u8] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the message and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of bytes in the frame, tag included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the frame has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex dump used in log lines.
    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl From<Vec<u8>> for WireMessage {
    fn from(bytes: Vec<u8>) -> Self {
        WireMessage(bytes)
    }
}

impl AsRef<[u8]> for WireMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for WireMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag().and_then(characteristic_name) {
            Some(name) => write!(f, "{} [{}]", name, self.to_hex()),
            None => write!(f, "[{}]", self.to_hex()),
        }
    }
}

/// One alarm slot on the watch.
///
/// Slot 0 is the primary alarm; slots 1.. are the secondary alarms. The
/// application layer exchanges these as JSON objects such as
/// `{"enabled": true, "hour": 7, "minute": 30, "hasHourlyChime": false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    /// Whether the alarm sounds.
    pub enabled: bool,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Whether the hourly time signal is on. Only meaningful on slot 0.
    #[serde(default)]
    pub has_hourly_chime: bool,
}

impl Alarm {
    /// Create an alarm with the hourly chime off.
    pub fn new(enabled: bool, hour: u8, minute: u8) -> Self {
        Alarm {
            enabled,
            hour,
            minute,
            has_hourly_chime: false,
        }
    }
}

/// Lowercase hex encoding without separators.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
