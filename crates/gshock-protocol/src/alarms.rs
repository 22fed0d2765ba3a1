//! Alarm codecs.
//!
//! The watch keeps the primary alarm and the secondary alarms under two
//! different tags, so an alarm list is always written as two frames:
//!
//! ```text
//! primary:   0x15 | entry(A0)
//! secondary: 0x16 | entry(A1) | entry(A2) | ...
//!
//! entry:     flags | 0x40 | hour | minute
//! flags:     bit 7 = hourly chime, bit 6 = enabled
//! ```

use bytes::BufMut;

use crate::constants::*;
use crate::error::*;
use crate::types::Alarm;

fn put_alarm_entry(buf: &mut Vec<u8>, alarm: &Alarm) -> ProtocolResult<()> {
    if alarm.hour > 23 {
        return Err(ProtocolError::Range {
            field: "alarm hour",
            value: alarm.hour as i64,
            max: 23,
        });
    }
    if alarm.minute > 59 {
        return Err(ProtocolError::Range {
            field: "alarm minute",
            value: alarm.minute as i64,
            max: 59,
        });
    }

    let mut flags = 0u8;
    if alarm.enabled {
        flags |= ALARM_ENABLED_MASK;
    }
    if alarm.has_hourly_chime {
        flags |= ALARM_HOURLY_CHIME_MASK;
    }

    buf.put_u8(flags);
    buf.put_u8(ALARM_CONSTANT_VALUE);
    buf.put_u8(alarm.hour);
    buf.put_u8(alarm.minute);
    Ok(())
}

/// Encode the primary alarm (slot 0) of an alarm list.
///
/// Fails with [`ProtocolError::Range`] if the list is empty.
pub fn encode_alarm_primary(alarms: &[Alarm]) -> ProtocolResult<Vec<u8>> {
    let first = alarms.first().ok_or(ProtocolError::Range {
        field: "alarm count",
        value: 0,
        max: 0,
    })?;

    let mut buf = Vec::with_capacity(1 + ALARM_ENTRY_SIZE);
    buf.put_u8(CASIO_SETTING_FOR_ALM);
    put_alarm_entry(&mut buf, first)?;
    Ok(buf)
}

/// Encode the secondary alarms (slots 1..) of an alarm list.
///
/// Fails with [`ProtocolError::Range`] if the list is empty, since a list
/// without a primary alarm is not a valid alarm set. A list holding only the
/// primary alarm encodes to the bare tag.
pub fn encode_alarm_secondary(alarms: &[Alarm]) -> ProtocolResult<Vec<u8>> {
    if alarms.is_empty() {
        return Err(ProtocolError::Range {
            field: "alarm count",
            value: 0,
            max: 0,
        });
    }

    let secondary = &alarms[1..];
    let mut buf = Vec::with_capacity(1 + secondary.len() * ALARM_ENTRY_SIZE);
    buf.put_u8(CASIO_SETTING_FOR_ALM2);
    for alarm in secondary {
        put_alarm_entry(&mut buf, alarm)?;
    }
    Ok(buf)
}

/// Decode a primary or secondary alarm frame into its entries.
pub fn decode_alarms(frame: &[u8]) -> ProtocolResult<Vec<Alarm>> {
    let tag = *frame.first().ok_or(ProtocolError::too_short(1, 0))?;
    if tag != CASIO_SETTING_FOR_ALM && tag != CASIO_SETTING_FOR_ALM2 {
        return Err(ProtocolError::UnexpectedTag {
            expected: CASIO_SETTING_FOR_ALM,
            actual: tag,
        });
    }

    let payload = &frame[1..];
    if payload.len() < ALARM_ENTRY_SIZE {
        return Err(ProtocolError::too_short(1 + ALARM_ENTRY_SIZE, frame.len()));
    }
    if payload.len() % ALARM_ENTRY_SIZE != 0 {
        return Err(ProtocolError::InvalidData(format!(
            "alarm payload of {} bytes is not a whole number of entries",
            payload.len()
        )));
    }

    let alarms: Vec<Alarm> = payload
        .chunks_exact(ALARM_ENTRY_SIZE)
        .map(|entry| Alarm {
            enabled: entry[0] & ALARM_ENABLED_MASK != 0,
            hour: entry[2],
            minute: entry[3],
            has_hourly_chime: entry[0] & ALARM_HOURLY_CHIME_MASK != 0,
        })
        .collect();
    log::trace!("decoded {} alarm(s) from tag 0x{:02X}", alarms.len(), tag);
    Ok(alarms)
}
