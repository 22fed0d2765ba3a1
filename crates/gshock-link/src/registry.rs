//! Pending-request registry.
//!
//! A correlated "get" writes a read request and returns immediately; the
//! answer surfaces later on the inbound notification path. The registry is
//! the meeting point: the outbound path registers a [`CompletionHandle`] for
//! a feature, the inbound path resolves it when the matching frame arrives,
//! and disconnects or timeouts cancel it.
//!
//! At most one request per [`FeatureId`] may be outstanding. Each entry also
//! carries a token unique to its registration, so a timeout or a dropped
//! handle only ever removes its own entry, never a newer one.
//!
//! Entries are removed under the lock before their sender is used, and a
//! oneshot sender is consumed by sending, so a handle completes exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::{LinkError, LinkResult, PendingError};
use crate::metric_defs::{PENDING_CANCELLED, PENDING_RESOLVED, PENDING_UNSOLICITED};
use crate::types::{FeatureId, FeatureValue};

type Completion = Result<FeatureValue, PendingError>;

/// Whether a correlating feature is waiting for the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationState {
    /// No request outstanding.
    Idle,
    /// A request was issued and its reply has not arrived yet.
    AwaitingResponse,
}

#[derive(Debug)]
struct PendingEntry {
    token: u64,
    sender: oneshot::Sender<Completion>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: Mutex<HashMap<FeatureId, PendingEntry>>,
    next_token: AtomicU64,
}

/// Outstanding correlations, keyed by feature.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Debug, Clone, Default)]
pub struct PendingRegistry {
    inner: Arc<RegistryInner>,
}

impl PendingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending request for `feature`.
    ///
    /// Fails with [`LinkError::AlreadyPending`] if one is already outstanding.
    pub fn register(&self, feature: FeatureId) -> LinkResult<CompletionHandle> {
        let mut entries = self.inner.entries.lock();
        if entries.contains_key(&feature) {
            return Err(LinkError::AlreadyPending(feature));
        }

        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        entries.insert(feature, PendingEntry { token, sender });
        trace!("registered {} request (token {})", feature, token);

        Ok(CompletionHandle {
            feature,
            token,
            receiver,
            registry: self.clone(),
        })
    }

    /// Current correlation state of `feature`.
    pub fn state(&self, feature: FeatureId) -> CorrelationState {
        if self.inner.entries.lock().contains_key(&feature) {
            CorrelationState::AwaitingResponse
        } else {
            CorrelationState::Idle
        }
    }

    /// Whether a request for `feature` is outstanding.
    pub fn is_pending(&self, feature: FeatureId) -> bool {
        self.state(feature) == CorrelationState::AwaitingResponse
    }

    /// Number of outstanding requests across all features.
    pub fn pending_count(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Deliver `value` to the caller waiting on `feature`.
    ///
    /// Returns `true` if a waiting caller received it. With nothing
    /// registered the value is unsolicited traffic and `false` is returned.
    pub fn resolve(&self, feature: FeatureId, value: FeatureValue) -> bool {
        let entry = self.inner.entries.lock().remove(&feature);
        let Some(entry) = entry else {
            debug!("no pending {} request, value is unsolicited", feature);
            metrics::counter!(PENDING_UNSOLICITED.name, "feature" => feature.as_str()).increment(1);
            return false;
        };

        if entry.sender.send(Ok(value)).is_err() {
            warn!(
                "{} reply arrived but its caller is gone (token {})",
                feature, entry.token
            );
            return false;
        }
        trace!("resolved {} request (token {})", feature, entry.token);
        metrics::counter!(PENDING_RESOLVED.name, "feature" => feature.as_str()).increment(1);
        true
    }

    /// Fail the request pending for `feature` with `Cancelled(reason)`.
    ///
    /// Returns `true` if there was one.
    pub fn cancel(&self, feature: FeatureId, reason: impl Into<String>) -> bool {
        self.fail(feature, None, PendingError::Cancelled(reason.into()))
    }

    /// Fail every outstanding request with `Cancelled(reason)`.
    ///
    /// Returns how many were cancelled.
    pub fn cancel_all(&self, reason: &str) -> usize {
        let drained: Vec<(FeatureId, PendingEntry)> = self.inner.entries.lock().drain().collect();
        let count = drained.len();
        for (feature, entry) in drained {
            Self::complete_with_error(feature, entry, PendingError::Cancelled(reason.to_string()));
        }
        if count > 0 {
            debug!("cancelled {} pending request(s): {}", count, reason);
        }
        count
    }

    /// Fail the entry registered under `token` with a timeout.
    fn expire(&self, feature: FeatureId, token: u64, timeout: Duration) -> bool {
        self.fail(feature, Some(token), PendingError::Timeout(timeout))
    }

    /// Drop the entry registered under `token` without completing it.
    fn discard(&self, feature: FeatureId, token: u64) {
        if self.take(feature, Some(token)).is_some() {
            debug!("{} handle dropped before its reply (token {})", feature, token);
        }
    }

    fn take(&self, feature: FeatureId, token: Option<u64>) -> Option<PendingEntry> {
        let mut entries = self.inner.entries.lock();
        match entries.get(&feature) {
            Some(entry) if token.map_or(true, |t| t == entry.token) => entries.remove(&feature),
            _ => None,
        }
    }

    fn fail(&self, feature: FeatureId, token: Option<u64>, error: PendingError) -> bool {
        match self.take(feature, token) {
            Some(entry) => {
                Self::complete_with_error(feature, entry, error);
                true
            }
            None => false,
        }
    }

    fn complete_with_error(feature: FeatureId, entry: PendingEntry, error: PendingError) {
        debug!("{} request (token {}) failed: {}", feature, entry.token, error);
        metrics::counter!(PENDING_CANCELLED.name, "feature" => feature.as_str()).increment(1);
        // The receiver may already be gone; nothing left to notify then.
        let _ = entry.sender.send(Err(error));
    }
}

/// The caller's side of a pending request.
///
/// Await it with [`wait`](Self::wait) or [`wait_timeout`](Self::wait_timeout).
/// Dropping the handle withdraws the request so the feature can be asked
/// again.
#[derive(Debug)]
pub struct CompletionHandle {
    feature: FeatureId,
    token: u64,
    receiver: oneshot::Receiver<Completion>,
    registry: PendingRegistry,
}

impl CompletionHandle {
    /// Feature this request belongs to.
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    /// Token unique to this registration.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Wait for the reply with no time bound.
    pub async fn wait(mut self) -> Result<FeatureValue, PendingError> {
        (&mut self.receiver)
            .await
            .unwrap_or_else(|_| Err(PendingError::Cancelled("registry dropped".to_string())))
    }

    /// Wait for the reply for at most `timeout`.
    ///
    /// On expiry the registry entry is cancelled with
    /// [`PendingError::Timeout`], so a reply arriving afterwards is treated as
    /// unsolicited.
    pub async fn wait_timeout(mut self, timeout: Duration) -> Result<FeatureValue, PendingError> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(result) => result
                .unwrap_or_else(|_| Err(PendingError::Cancelled("registry dropped".to_string()))),
            Err(_) => {
                if self.registry.expire(self.feature, self.token, timeout) {
                    return Err(PendingError::Timeout(timeout));
                }
                // Completed between the deadline and the expiry above.
                self.receiver
                    .try_recv()
                    .unwrap_or(Err(PendingError::Timeout(timeout)))
            }
        }
    }
}

impl Drop for CompletionHandle {
    fn drop(&mut self) {
        self.registry.discard(self.feature, self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_is_already_pending() {
        let registry = PendingRegistry::new();
        let _first = registry.register(FeatureId::Timer).unwrap();
        let second = registry.register(FeatureId::Timer);
        assert!(matches!(second, Err(LinkError::AlreadyPending(FeatureId::Timer))));
        assert_eq!(registry.pending_count(), 1);
    }

    #[test]
    fn test_features_are_independent() {
        let registry = PendingRegistry::new();
        let _timer = registry.register(FeatureId::Timer).unwrap();
        let _name = registry.register(FeatureId::WatchName).unwrap();
        assert_eq!(registry.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_resolve_delivers_value() {
        let registry = PendingRegistry::new();
        let handle = registry.register(FeatureId::Timer).unwrap();
        assert_eq!(registry.state(FeatureId::Timer), CorrelationState::AwaitingResponse);

        assert!(registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(150)));
        assert_eq!(handle.wait().await, Ok(FeatureValue::TimerSeconds(150)));
        assert_eq!(registry.state(FeatureId::Timer), CorrelationState::Idle);
    }

    #[test]
    fn test_resolve_without_pending_is_noop() {
        let registry = PendingRegistry::new();
        assert!(!registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(1)));
    }

    #[tokio::test]
    async fn test_resolve_does_not_cross_features() {
        let registry = PendingRegistry::new();
        let timer = registry.register(FeatureId::Timer).unwrap();
        let name = registry.register(FeatureId::WatchName).unwrap();

        assert!(registry.resolve(
            FeatureId::WatchName,
            FeatureValue::WatchName("CASIO GW-B5600".to_string())
        ));
        assert!(registry.is_pending(FeatureId::Timer));
        assert_eq!(
            name.wait().await.unwrap().as_watch_name(),
            Some("CASIO GW-B5600")
        );

        assert!(registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(60)));
        assert_eq!(timer.wait().await.unwrap().as_timer_seconds(), Some(60));
    }

    #[tokio::test]
    async fn test_cancel_then_stray_reply() {
        let registry = PendingRegistry::new();
        let handle = registry.register(FeatureId::Timer).unwrap();

        assert!(registry.cancel(FeatureId::Timer, "disconnect"));
        assert!(!registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(150)));
        assert_eq!(
            handle.wait().await,
            Err(PendingError::Cancelled("disconnect".to_string()))
        );
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let registry = PendingRegistry::new();
        let timer = registry.register(FeatureId::Timer).unwrap();
        let name = registry.register(FeatureId::WatchName).unwrap();

        assert_eq!(registry.cancel_all("link lost"), 2);
        assert_eq!(registry.pending_count(), 0);
        assert!(matches!(timer.wait().await, Err(PendingError::Cancelled(r)) if r == "link lost"));
        assert!(matches!(name.wait().await, Err(PendingError::Cancelled(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_expires_entry() {
        let registry = PendingRegistry::new();
        let handle = registry.register(FeatureId::Timer).unwrap();

        let result = handle.wait_timeout(Duration::from_millis(100)).await;
        assert_eq!(result, Err(PendingError::Timeout(Duration::from_millis(100))));
        assert!(!registry.is_pending(FeatureId::Timer));
        assert!(!registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_returns_early_reply() {
        let registry = PendingRegistry::new();
        let handle = registry.register(FeatureId::Timer).unwrap();
        registry.resolve(FeatureId::Timer, FeatureValue::TimerSeconds(42));

        let result = handle.wait_timeout(Duration::from_secs(1)).await;
        assert_eq!(result, Ok(FeatureValue::TimerSeconds(42)));
    }

    #[test]
    fn test_stale_token_does_not_touch_newer_request() {
        let registry = PendingRegistry::new();
        let first = registry.register(FeatureId::Timer).unwrap();
        let stale = first.token();
        registry.cancel(FeatureId::Timer, "retry");
        drop(first);

        let second = registry.register(FeatureId::Timer).unwrap();
        assert_ne!(second.token(), stale);
        assert!(!registry.expire(FeatureId::Timer, stale, Duration::from_secs(1)));
        assert!(registry.is_pending(FeatureId::Timer));
    }

    #[test]
    fn test_dropping_handle_frees_feature() {
        let registry = PendingRegistry::new();
        let handle = registry.register(FeatureId::Timer).unwrap();
        drop(handle);
        assert!(!registry.is_pending(FeatureId::Timer));
        assert!(registry.register(FeatureId::Timer).is_ok());
    }
}
