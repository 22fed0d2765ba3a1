//! Capabilities consumed from the transport layer.
//!
//! The link never talks to BLE directly. It is handed a [`Connection`] that
//! can write to a GATT handle, issue a read request and subscribe to
//! notifications, and a [`CharacteristicTable`] that maps characteristic
//! names to handles.

use std::collections::HashMap;

use async_trait::async_trait;
use gshock_protocol::{CHAR_ALL_FEATURES, CHAR_READ_REQUEST_FOR_ALL_FEATURES};

use crate::config::HandleConfig;
use crate::error::{LinkError, LinkResult, TransportError};

/// Callback invoked by the transport once per received notification frame.
pub type NotificationCallback = Box<dyn Fn(&[u8]) + Send + Sync>;

/// The physical link to one watch.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Write `payload` to the characteristic at `handle`.
    ///
    /// Resolves once the transport has acknowledged the write.
    async fn write(&self, handle: u16, payload: &[u8]) -> Result<(), TransportError>;

    /// Ask the watch to report the feature identified by `code`.
    ///
    /// The answer arrives later as a notification, never as this call's
    /// return value.
    async fn request(&self, code: u8) -> Result<(), TransportError>;

    /// Route every notification from `handle` into `callback`.
    async fn subscribe(
        &self,
        handle: u16,
        callback: NotificationCallback,
    ) -> Result<(), TransportError>;
}

/// Name to GATT handle lookup.
pub trait CharacteristicTable: Send + Sync {
    /// Handle of the named characteristic, if the table knows it.
    fn address_of(&self, name: &str) -> Option<u16>;
}

/// The characteristic table of Casio watches.
#[derive(Debug, Clone)]
pub struct CasioCharacteristics {
    handles: HashMap<&'static str, u16>,
}

impl CasioCharacteristics {
    /// Build the table from configured handle numbers.
    pub fn new(config: &HandleConfig) -> Self {
        let handles = HashMap::from([
            (CHAR_READ_REQUEST_FOR_ALL_FEATURES, config.read_request),
            (CHAR_ALL_FEATURES, config.all_features),
        ]);
        CasioCharacteristics { handles }
    }
}

impl Default for CasioCharacteristics {
    fn default() -> Self {
        Self::new(&HandleConfig::default())
    }
}

impl CharacteristicTable for CasioCharacteristics {
    fn address_of(&self, name: &str) -> Option<u16> {
        self.handles.get(name).copied()
    }
}

/// The two handles every feature writes to, resolved once up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handles {
    /// Target of single-byte "get" requests.
    pub read_request: u16,
    /// Target of full feature frames.
    pub all_features: u16,
}

impl Handles {
    /// Resolve the handles from a characteristic table.
    pub fn resolve(table: &dyn CharacteristicTable) -> LinkResult<Self> {
        let lookup = |name: &str| {
            table
                .address_of(name)
                .ok_or_else(|| LinkError::UnknownCharacteristic(name.to_string()))
        };
        Ok(Handles {
            read_request: lookup(CHAR_READ_REQUEST_FOR_ALL_FEATURES)?,
            all_features: lookup(CHAR_ALL_FEATURES)?,
        })
    }
}

impl Default for Handles {
    fn default() -> Self {
        let config = HandleConfig::default();
        Handles {
            read_request: config.read_request,
            all_features: config.all_features,
        }
    }
}
