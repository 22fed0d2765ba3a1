//! Message dispatcher.
//!
//! The two routing tables are the whole of the link's protocol knowledge:
//! action name → feature sender for outbound traffic, characteristic id →
//! feature receiver for inbound traffic. A [`RoutingTable`] is built once and
//! handed to the [`Dispatcher`], which never mutates it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gshock_protocol::*;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::config::LinkConfig;
use crate::connection::{CasioCharacteristics, CharacteristicTable, Connection, Handles};
use crate::error::{LinkError, LinkResult};
use crate::features::*;
use crate::metric_defs::{DISPATCH_INBOUND, DISPATCH_OUTBOUND, DISPATCH_UNKNOWN};
use crate::registry::{CompletionHandle, PendingRegistry};
use crate::types::{FeatureId, FeatureValue, Notification};

// ============================================================================
// Action Names
// ============================================================================

/// Read the alarms.
pub const GET_ALARMS: &str = "GET_ALARMS";
/// Replace the alarms.
pub const SET_ALARMS: &str = "SET_ALARMS";
/// Write reminders.
pub const SET_REMINDERS: &str = "SET_REMINDERS";
/// Read the basic settings.
pub const GET_SETTINGS: &str = "GET_SETTINGS";
/// Write the basic settings.
pub const SET_SETTINGS: &str = "SET_SETTINGS";
/// Read the time adjustment settings.
pub const GET_TIME_ADJUSTMENT: &str = "GET_TIME_ADJUSTMENT";
/// Write the time adjustment settings.
pub const SET_TIME_ADJUSTMENT: &str = "SET_TIME_ADJUSTMENT";
/// Read the countdown timer (correlated).
pub const GET_TIMER: &str = "GET_TIMER";
/// Set the countdown timer.
pub const SET_TIMER: &str = "SET_TIMER";
/// Set the watch clock.
pub const SET_TIME: &str = "SET_TIME";
/// Read the watch name (correlated).
pub const GET_WATCH_NAME: &str = "GET_WATCH_NAME";

// ============================================================================
// Routing Table
// ============================================================================

/// Which of a feature's two send operations an action maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    /// [`Feature::send_to_watch`].
    Get,
    /// [`Feature::send_to_watch_set`].
    Set,
}

#[derive(Clone)]
struct SendRoute {
    kind: SendKind,
    feature: Arc<dyn Feature>,
}

/// Immutable action and characteristic routing.
pub struct RoutingTable {
    senders: HashMap<&'static str, SendRoute>,
    receivers: HashMap<u8, Arc<dyn Feature>>,
    unknown: Arc<dyn Feature>,
}

impl std::fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<_> = self.senders.keys().collect();
        actions.sort();
        let mut ids: Vec<_> = self.receivers.keys().collect();
        ids.sort();
        f.debug_struct("RoutingTable")
            .field("actions", &actions)
            .field("characteristics", &ids)
            .finish()
    }
}

impl RoutingTable {
    /// Start a table whose unmatched inbound frames go to `unknown`.
    pub fn builder(unknown: Arc<dyn Feature>) -> RoutingTableBuilder {
        RoutingTableBuilder {
            table: RoutingTable {
                senders: HashMap::new(),
                receivers: HashMap::new(),
                unknown,
            },
        }
    }

    /// The full Casio routing table.
    pub fn casio(handles: Handles, registry: &PendingRegistry) -> Self {
        let alarms: Arc<dyn Feature> = Arc::new(AlarmsFeature::new(handles));
        let events: Arc<dyn Feature> = Arc::new(
            TaggedFeature::new(FeatureId::Events, handles)
                .with_writes(&[CASIO_REMINDER_TITLE, CASIO_REMINDER_TIME])
                .with_decoder(decode_event),
        );
        let settings: Arc<dyn Feature> = Arc::new(
            TaggedFeature::new(FeatureId::Settings, handles)
                .with_request(CASIO_SETTING_FOR_BASIC)
                .with_writes(&[CASIO_SETTING_FOR_BASIC]),
        );
        let time_adjustment: Arc<dyn Feature> = Arc::new(
            TaggedFeature::new(FeatureId::TimeAdjustment, handles)
                .with_request(CASIO_SETTING_FOR_BLE)
                .with_writes(&[CASIO_SETTING_FOR_BLE]),
        );
        let timer: Arc<dyn Feature> = Arc::new(TimerFeature::new(handles, registry.clone()));
        let clock: Arc<dyn Feature> = Arc::new(ClockFeature::new(handles));
        let watch_name: Arc<dyn Feature> = Arc::new(WatchNameFeature::new(registry.clone()));
        let observer =
            |id: FeatureId| -> Arc<dyn Feature> { Arc::new(TaggedFeature::new(id, handles)) };
        let unknown = observer(FeatureId::Unknown);

        RoutingTable::builder(unknown.clone())
            .sender(GET_ALARMS, SendKind::Get, alarms.clone())
            .sender(SET_ALARMS, SendKind::Set, alarms.clone())
            .sender(SET_REMINDERS, SendKind::Set, events.clone())
            .sender(GET_SETTINGS, SendKind::Get, settings.clone())
            .sender(SET_SETTINGS, SendKind::Set, settings.clone())
            .sender(GET_TIME_ADJUSTMENT, SendKind::Get, time_adjustment.clone())
            .sender(SET_TIME_ADJUSTMENT, SendKind::Set, time_adjustment.clone())
            .sender(GET_TIMER, SendKind::Get, timer.clone())
            .sender(SET_TIMER, SendKind::Set, timer.clone())
            .sender(SET_TIME, SendKind::Set, clock)
            .sender(GET_WATCH_NAME, SendKind::Get, watch_name.clone())
            .receiver(CASIO_SETTING_FOR_ALM, alarms.clone())
            .receiver(CASIO_SETTING_FOR_ALM2, alarms)
            .receiver(CASIO_DST_SETTING, observer(FeatureId::DstForWorldCities))
            .receiver(CASIO_REMINDER_TIME, events.clone())
            .receiver(CASIO_REMINDER_TITLE, events)
            .receiver(CASIO_TIMER, timer)
            .receiver(CASIO_WORLD_CITIES, observer(FeatureId::WorldCities))
            .receiver(CASIO_DST_WATCH_STATE, observer(FeatureId::DstWatchState))
            .receiver(CASIO_WATCH_NAME, watch_name)
            .receiver(CASIO_WATCH_CONDITION, observer(FeatureId::WatchCondition))
            .receiver(CASIO_APP_INFORMATION, observer(FeatureId::AppInfo))
            .receiver(CASIO_BLE_FEATURES, observer(FeatureId::ButtonPressed))
            .receiver(CASIO_SETTING_FOR_BASIC, settings)
            .receiver(CASIO_SETTING_FOR_BLE, time_adjustment)
            .receiver(ERROR, observer(FeatureId::Error))
            .receiver(UNKNOWN, unknown)
            .build()
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&'static str> {
        let mut actions: Vec<_> = self.senders.keys().copied().collect();
        actions.sort_unstable();
        actions
    }

    /// Whether an inbound id has a dedicated receiver.
    pub fn has_receiver(&self, id: u8) -> bool {
        self.receivers.contains_key(&id)
    }
}

/// Reminder titles decode to text; reminder times stay raw.
fn decode_event(frame: &[u8]) -> ProtocolResult<Option<FeatureValue>> {
    match frame.first() {
        Some(&CASIO_REMINDER_TITLE) => {
            Ok(Some(FeatureValue::ReminderTitle(decode_reminder_title(frame)?)))
        }
        _ => Ok(None),
    }
}

/// Builder for [`RoutingTable`].
///
/// Every key is registered exactly once; registering a key twice is a bug
/// in the table definition and trips a debug assertion.
pub struct RoutingTableBuilder {
    table: RoutingTable,
}

impl RoutingTableBuilder {
    /// Route `action` to `feature`.
    pub fn sender(mut self, action: &'static str, kind: SendKind, feature: Arc<dyn Feature>) -> Self {
        let previous = self.table.senders.insert(action, SendRoute { kind, feature });
        debug_assert!(previous.is_none(), "action {} registered twice", action);
        self
    }

    /// Route inbound frames tagged `id` to `feature`.
    pub fn receiver(mut self, id: u8, feature: Arc<dyn Feature>) -> Self {
        let previous = self.table.receivers.insert(id, feature);
        debug_assert!(previous.is_none(), "characteristic 0x{:02X} registered twice", id);
        self
    }

    /// Finish the table.
    pub fn build(self) -> RoutingTable {
        self.table
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Entry point between the application, the transport and the features.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RoutingTable,
    registry: PendingRegistry,
    handles: Handles,
    notifications: broadcast::Sender<Notification>,
    request_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over a prepared routing table.
    ///
    /// `registry` must be the one the table's correlating features were
    /// built with, so that [`on_disconnect`](Self::on_disconnect) reaches
    /// their requests.
    pub fn new(
        routes: RoutingTable,
        registry: PendingRegistry,
        handles: Handles,
        config: &LinkConfig,
    ) -> Self {
        let (notifications, _) = broadcast::channel(config.notification_buffer.max(1));
        Dispatcher {
            routes,
            registry,
            handles,
            notifications,
            request_timeout: config.request_timeout(),
        }
    }

    /// Create a dispatcher with the Casio routing table, resolving handles
    /// through `table`.
    pub fn casio(config: &LinkConfig, table: &dyn CharacteristicTable) -> LinkResult<Self> {
        let handles = Handles::resolve(table)?;
        let registry = PendingRegistry::new();
        let routes = RoutingTable::casio(handles, &registry);
        Ok(Self::new(routes, registry, handles, config))
    }

    /// Create a Casio dispatcher using the handles from `config`.
    pub fn from_config(config: &LinkConfig) -> LinkResult<Self> {
        Self::casio(config, &CasioCharacteristics::new(&config.handles))
    }

    /// The routing table.
    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// The pending-request registry.
    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }

    /// Receive every inbound frame that was not consumed by a pending
    /// request.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Send `action` to the watch.
    ///
    /// Fails with [`LinkError::UnknownAction`] without touching the
    /// connection if no sender is registered for `action`.
    pub async fn dispatch_outbound(
        &self,
        conn: &dyn Connection,
        action: &str,
        message: &Value,
    ) -> LinkResult<Dispatched> {
        let (&action, route) = self
            .routes
            .senders
            .get_key_value(action)
            .ok_or_else(|| LinkError::UnknownAction(action.to_string()))?;

        trace!("dispatching {} to {}", action, route.feature.id());
        metrics::counter!(DISPATCH_OUTBOUND.name, "action" => action).increment(1);

        match route.kind {
            SendKind::Get => route.feature.send_to_watch(conn, message).await,
            SendKind::Set => route.feature.send_to_watch_set(conn, message).await,
        }
    }

    /// Route one inbound frame to its receiver.
    ///
    /// Never fails: unmatched ids go to the unknown handler and decode
    /// errors are logged and the frame dropped. Returns the feature that
    /// handled the frame.
    pub fn dispatch_inbound(&self, frame: &[u8]) -> FeatureId {
        let receiver = frame.first().and_then(|id| self.routes.receivers.get(id));
        let feature = match receiver {
            Some(feature) => feature,
            None => {
                debug!(
                    "no receiver for characteristic {:?}, routing to unknown",
                    frame.first()
                );
                metrics::counter!(DISPATCH_UNKNOWN.name).increment(1);
                &self.routes.unknown
            }
        };

        let id = feature.id();
        metrics::counter!(DISPATCH_INBOUND.name, "feature" => id.as_str()).increment(1);

        match feature.on_received(frame) {
            Ok(Received::Resolved) => trace!("{} frame resolved a pending request", id),
            Ok(Received::Passive(value)) => {
                let notification = Notification {
                    feature: id,
                    frame: WireMessage::from_slice(frame),
                    value,
                };
                trace!("{} notification: {}", id, notification.frame);
                // No subscribers is fine.
                let _ = self.notifications.send(notification);
            }
            Err(e) => warn!(
                "dropping {} frame [{}]: {}",
                id,
                hex_encode(frame),
                e
            ),
        }
        id
    }

    /// Start a correlated "get" and return its handle.
    ///
    /// Actions that do not start a correlated request fail with
    /// [`LinkError::Unsupported`] before anything reaches the connection.
    pub async fn request(&self, conn: &dyn Connection, action: &str) -> LinkResult<CompletionHandle> {
        let route = self
            .routes
            .senders
            .get(action)
            .ok_or_else(|| LinkError::UnknownAction(action.to_string()))?;
        let unsupported = LinkError::Unsupported {
            feature: route.feature.id(),
            operation: "request",
        };
        if route.kind != SendKind::Get || !route.feature.correlates() {
            return Err(unsupported);
        }

        match self.dispatch_outbound(conn, action, &Value::Null).await? {
            Dispatched::Pending(handle) => Ok(handle),
            Dispatched::Sent => Err(unsupported),
        }
    }

    /// Wait for a correlated reply, bounded by the configured timeout.
    pub async fn await_reply(&self, handle: CompletionHandle) -> LinkResult<FeatureValue> {
        Ok(handle.wait_timeout(self.request_timeout).await?)
    }

    /// Cancel every outstanding request because the link went away.
    pub fn on_disconnect(&self, reason: &str) -> usize {
        let cancelled = self.registry.cancel_all(reason);
        debug!("disconnect ({}): cancelled {} request(s)", reason, cancelled);
        cancelled
    }

    /// Subscribe to the all-features characteristic and feed every
    /// notification into [`dispatch_inbound`](Self::dispatch_inbound).
    pub async fn attach(self: &Arc<Self>, conn: &dyn Connection) -> LinkResult<()> {
        let dispatcher = Arc::clone(self);
        conn.subscribe(
            self.handles.all_features,
            Box::new(move |frame: &[u8]| {
                dispatcher.dispatch_inbound(frame);
            }),
        )
        .await?;
        Ok(())
    }
}
