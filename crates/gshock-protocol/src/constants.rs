//! Protocol constants
//!
//! Feature tags (the leading byte of every frame), GATT handles and the
//! reserved sentinel ids used by the G-Shock companion protocol.

// ============================================================================
// GATT Handles
// ============================================================================

/// Handle of the characteristic that accepts read requests for any feature.
pub const HANDLE_READ_REQUEST_FOR_ALL_FEATURES: u16 = 0x000C;
/// Handle of the characteristic that carries full feature frames.
pub const HANDLE_ALL_FEATURES: u16 = 0x000E;

/// Table name of the read-request characteristic.
pub const CHAR_READ_REQUEST_FOR_ALL_FEATURES: &str = "CASIO_READ_REQUEST_FOR_ALL_FEATURES";
/// Table name of the all-features characteristic.
pub const CHAR_ALL_FEATURES: &str = "CASIO_ALL_FEATURES";

// ============================================================================
// Feature Tags
// ============================================================================

/// Current time (host → watch).
pub const CASIO_CURRENT_TIME: u8 = 0x09;
/// Button pressed / BLE feature flags.
pub const CASIO_BLE_FEATURES: u8 = 0x10;
/// BLE settings, including the time adjustment schedule.
pub const CASIO_SETTING_FOR_BLE: u8 = 0x11;
/// Basic watch settings (light, power saving, 12/24h, ...).
pub const CASIO_SETTING_FOR_BASIC: u8 = 0x13;
/// Primary alarm.
pub const CASIO_SETTING_FOR_ALM: u8 = 0x15;
/// Secondary alarms.
pub const CASIO_SETTING_FOR_ALM2: u8 = 0x16;
/// Countdown timer.
pub const CASIO_TIMER: u8 = 0x18;
/// DST state of the home city.
pub const CASIO_DST_WATCH_STATE: u8 = 0x1D;
/// DST settings of the world cities.
pub const CASIO_DST_SETTING: u8 = 0x1E;
/// World cities.
pub const CASIO_WORLD_CITIES: u8 = 0x1F;
/// Application information.
pub const CASIO_APP_INFORMATION: u8 = 0x22;
/// Watch model name.
pub const CASIO_WATCH_NAME: u8 = 0x23;
/// Battery and temperature condition.
pub const CASIO_WATCH_CONDITION: u8 = 0x28;
/// Reminder title.
pub const CASIO_REMINDER_TITLE: u8 = 0x30;
/// Reminder time and repeat schedule.
pub const CASIO_REMINDER_TIME: u8 = 0x31;

// ============================================================================
// Sentinels
// ============================================================================

/// Reserved id for error frames emitted by the watch.
pub const ERROR: u8 = 0xFF;
/// Reserved id for frames that no feature claims.
pub const UNKNOWN: u8 = 0x00;

// ============================================================================
// Field Layout
// ============================================================================

/// Length of an encoded timer frame.
pub const TIMER_FRAME_SIZE: usize = 7;
/// Length of one encoded alarm entry.
pub const ALARM_ENTRY_SIZE: usize = 4;
/// Constant second byte of every alarm entry.
pub const ALARM_CONSTANT_VALUE: u8 = 0x40;
/// Alarm flag bit: alarm is enabled.
pub const ALARM_ENABLED_MASK: u8 = 0b0100_0000;
/// Alarm flag bit: hourly chime is enabled.
pub const ALARM_HOURLY_CHIME_MASK: u8 = 0b1000_0000;
/// Length of an encoded current-time frame.
pub const CURRENT_TIME_FRAME_SIZE: usize = 11;

/// Returns the protocol name of a characteristic id, if it is one we know.
pub fn characteristic_name(id: u8) -> Option<&'static str> {
    let name = match id {
        CASIO_CURRENT_TIME => "CASIO_CURRENT_TIME",
        CASIO_BLE_FEATURES => "CASIO_BLE_FEATURES",
        CASIO_SETTING_FOR_BLE => "CASIO_SETTING_FOR_BLE",
        CASIO_SETTING_FOR_BASIC => "CASIO_SETTING_FOR_BASIC",
        CASIO_SETTING_FOR_ALM => "CASIO_SETTING_FOR_ALM",
        CASIO_SETTING_FOR_ALM2 => "CASIO_SETTING_FOR_ALM2",
        CASIO_TIMER => "CASIO_TIMER",
        CASIO_DST_WATCH_STATE => "CASIO_DST_WATCH_STATE",
        CASIO_DST_SETTING => "CASIO_DST_SETTING",
        CASIO_WORLD_CITIES => "CASIO_WORLD_CITIES",
        CASIO_APP_INFORMATION => "CASIO_APP_INFORMATION",
        CASIO_WATCH_NAME => "CASIO_WATCH_NAME",
        CASIO_WATCH_CONDITION => "CASIO_WATCH_CONDITION",
        CASIO_REMINDER_TITLE => "CASIO_REMINDER_TITLE",
        CASIO_REMINDER_TIME => "CASIO_REMINDER_TIME",
        ERROR => "ERROR",
        UNKNOWN => "UNKNOWN",
        _ => return None,
    };
    Some(name)
}
