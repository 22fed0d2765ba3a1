//! Shared test fixtures: a transport that records what the link does.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use gshock_link::{Connection, NotificationCallback, TransportError};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// One call the link made on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Write { handle: u16, payload: Vec<u8> },
    Request { code: u8 },
}

/// A [`Connection`] that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingConnection {
    calls: Mutex<Vec<Call>>,
    fail_writes_after: Mutex<Option<usize>>,
    fail_requests: Mutex<bool>,
    held_request: Mutex<Option<Arc<Notify>>>,
    subscriber: Mutex<Option<(u16, NotificationCallback)>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` writes, then fail every later one.
    pub fn fail_writes_after(&self, count: usize) {
        *self.fail_writes_after.lock() = Some(count);
    }

    pub fn fail_requests(&self) {
        *self.fail_requests.lock() = true;
    }

    /// Keep the next read request in flight until the returned gate is
    /// notified. The request's outcome is decided after release.
    pub fn hold_next_request(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_request.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Write { handle, payload } => Some((*handle, payload.clone())),
                Call::Request { .. } => None,
            })
            .collect()
    }

    pub fn subscribed_handle(&self) -> Option<u16> {
        self.subscriber.lock().as_ref().map(|(handle, _)| *handle)
    }

    /// Deliver a notification the way the BLE stack would.
    pub fn notify(&self, frame: &[u8]) {
        if let Some((_, callback)) = self.subscriber.lock().as_ref() {
            callback(frame);
        }
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn write(&self, handle: u16, payload: &[u8]) -> Result<(), TransportError> {
        let written = self.writes().len();
        if let Some(limit) = *self.fail_writes_after.lock() {
            if written >= limit {
                return Err(TransportError::WriteFailed("not acknowledged".to_string()));
            }
        }
        self.calls.lock().push(Call::Write {
            handle,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn request(&self, code: u8) -> Result<(), TransportError> {
        let held = self.held_request.lock().take();
        if let Some(gate) = held {
            gate.notified().await;
        }
        if *self.fail_requests.lock() {
            return Err(TransportError::Disconnected);
        }
        self.calls.lock().push(Call::Request { code });
        Ok(())
    }

    async fn subscribe(
        &self,
        handle: u16,
        callback: NotificationCallback,
    ) -> Result<(), TransportError> {
        *self.subscriber.lock() = Some((handle, callback));
        Ok(())
    }
}

/// Install a test log subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}
