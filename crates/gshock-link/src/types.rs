//! Types shared by the features, the registry and the dispatcher.

use gshock_protocol::{Alarm, ReminderTitle, WireMessage};

/// Identity of one protocol feature.
///
/// Pending correlations are keyed by this, so two different features can
/// each have a request in flight without ever resolving each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    /// Primary and secondary alarms.
    Alarms,
    /// Reminders (calendar events).
    Events,
    /// Basic watch settings.
    Settings,
    /// Time adjustment schedule.
    TimeAdjustment,
    /// Countdown timer.
    Timer,
    /// Current time.
    Time,
    /// Watch model name.
    WatchName,
    /// DST settings of the world cities.
    DstForWorldCities,
    /// World cities.
    WorldCities,
    /// DST state of the home city.
    DstWatchState,
    /// Battery and temperature condition.
    WatchCondition,
    /// Application information.
    AppInfo,
    /// Which button connected the watch.
    ButtonPressed,
    /// Error frames.
    Error,
    /// Frames no other feature claims.
    Unknown,
}

impl FeatureId {
    /// Stable lowercase name, used in logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeatureId::Alarms => "alarms",
            FeatureId::Events => "events",
            FeatureId::Settings => "settings",
            FeatureId::TimeAdjustment => "time_adjustment",
            FeatureId::Timer => "timer",
            FeatureId::Time => "time",
            FeatureId::WatchName => "watch_name",
            FeatureId::DstForWorldCities => "dst_for_world_cities",
            FeatureId::WorldCities => "world_cities",
            FeatureId::DstWatchState => "dst_watch_state",
            FeatureId::WatchCondition => "watch_condition",
            FeatureId::AppInfo => "app_info",
            FeatureId::ButtonPressed => "button_pressed",
            FeatureId::Error => "error",
            FeatureId::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded value reported by the watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    /// Countdown timer setting, in seconds.
    TimerSeconds(u32),
    /// Alarm entries from one alarm frame.
    Alarms(Vec<Alarm>),
    /// Watch model name.
    WatchName(String),
    /// One reminder title.
    ReminderTitle(ReminderTitle),
}

impl FeatureValue {
    /// The timer seconds, if this is a timer value.
    pub fn as_timer_seconds(&self) -> Option<u32> {
        match self {
            FeatureValue::TimerSeconds(seconds) => Some(*seconds),
            _ => None,
        }
    }

    /// The watch name, if this is a watch-name value.
    pub fn as_watch_name(&self) -> Option<&str> {
        match self {
            FeatureValue::WatchName(name) => Some(name),
            _ => None,
        }
    }
}

/// An inbound frame that was not consumed by a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Feature whose receiver handled the frame.
    pub feature: FeatureId,
    /// The raw frame, tag included.
    pub frame: WireMessage,
    /// Decoded value, for features that have a decoder.
    pub value: Option<FeatureValue>,
}

impl Notification {
    /// The characteristic id the frame arrived with.
    pub fn characteristic(&self) -> Option<u8> {
        self.frame.tag()
    }
}
