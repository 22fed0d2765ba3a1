//! Link configuration.
//!
//! Loaded from YAML; every field has a default so an empty document is a
//! valid configuration:
//!
//! ```yaml
//! request_timeout_ms: 5000
//! notification_buffer: 64
//! handles:
//!   read_request: 12
//!   all_features: 14
//! ```

use std::path::Path;
use std::time::Duration;

use gshock_protocol::{HANDLE_ALL_FEATURES, HANDLE_READ_REQUEST_FOR_ALL_FEATURES};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// How long [`Dispatcher::await_reply`](crate::Dispatcher::await_reply)
    /// waits before cancelling a correlated request.
    pub request_timeout_ms: u64,
    /// Capacity of the passive notification channel.
    pub notification_buffer: usize,
    /// GATT handles backing the default characteristic table.
    pub handles: HandleConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            request_timeout_ms: 5000,
            notification_buffer: 64,
            handles: HandleConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// The request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// GATT handle numbers of the two characteristics the link writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Characteristic that accepts single-byte read requests.
    pub read_request: u16,
    /// Characteristic that carries full feature frames.
    pub all_features: u16,
}

impl Default for HandleConfig {
    fn default() -> Self {
        HandleConfig {
            read_request: HANDLE_READ_REQUEST_FOR_ALL_FEATURES,
            all_features: HANDLE_ALL_FEATURES,
        }
    }
}
