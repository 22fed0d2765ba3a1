//! Current-time codec.
//!
//! ```text
//! +------+---------+---------+-------+-----+------+--------+--------+---------+---+---+
//! | 0x09 | year_lo | year_hi | month | day | hour | minute | second | weekday | 0 | 1 |
//! +------+---------+---------+-------+-----+------+--------+--------+---------+---+---+
//! ```
//!
//! `weekday` counts from Monday = 0. The two trailing bytes are the
//! fractional second (always zero) and the adjust reason (manual = 1).

use bytes::BufMut;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use crate::constants::*;
use crate::error::*;

const ADJUST_REASON_MANUAL: u8 = 1;

/// Encode a local wall-clock time into a current-time frame.
pub fn encode_current_time(time: &NaiveDateTime) -> ProtocolResult<Vec<u8>> {
    let year = time.year();
    let year = u16::try_from(year).map_err(|_| ProtocolError::Range {
        field: "year",
        value: year as i64,
        max: u16::MAX as i64,
    })?;

    let mut buf = Vec::with_capacity(CURRENT_TIME_FRAME_SIZE);
    buf.put_u8(CASIO_CURRENT_TIME);
    buf.put_u16_le(year);
    buf.put_u8(time.month() as u8);
    buf.put_u8(time.day() as u8);
    buf.put_u8(time.hour() as u8);
    buf.put_u8(time.minute() as u8);
    buf.put_u8(time.second() as u8);
    buf.put_u8(time.weekday().num_days_from_monday() as u8);
    buf.put_u8(0);
    buf.put_u8(ADJUST_REASON_MANUAL);
    Ok(buf)
}

/// Parse the timestamp carried by a set-time message.
///
/// Accepts RFC 3339 (the wall-clock part is kept, the offset dropped) or a
/// bare `YYYY-MM-DDTHH:MM:SS` local time.
pub fn parse_local_timestamp(text: &str) -> ProtocolResult<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| ProtocolError::InvalidData(format!("bad timestamp '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_encode_current_time_layout() {
        // 2024-03-15 was a Friday.
        let time = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(13, 45, 9)
            .unwrap();
        let frame = encode_current_time(&time).unwrap();
        assert_eq!(
            frame,
            vec![CASIO_CURRENT_TIME, 0xE8, 0x07, 3, 15, 13, 45, 9, 4, 0, 1]
        );
        assert_eq!(frame.len(), CURRENT_TIME_FRAME_SIZE);
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let time = parse_local_timestamp("2024-03-15T13:45:09+02:00").unwrap();
        assert_eq!((time.hour(), time.minute(), time.second()), (13, 45, 9));
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let time = parse_local_timestamp("2024-03-15T07:00:00").unwrap();
        assert_eq!(time.hour(), 7);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_local_timestamp("yesterday"),
            Err(ProtocolError::InvalidData(_))
        ));
    }
}
