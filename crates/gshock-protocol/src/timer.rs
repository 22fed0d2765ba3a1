//! Countdown timer codec.
//!
//! ```text
//! +------+-------+---------+---------+----------+
//! | 0x18 | hours | minutes | seconds | 0  0  0  |
//! +------+-------+---------+---------+----------+
//! ```

use bytes::BufMut;

use crate::constants::*;
use crate::error::*;

/// Largest duration the one-byte hour field can carry.
pub const MAX_TIMER_SECONDS: i64 = 255 * 3600 + 59 * 60 + 59;

/// Encode a countdown duration in seconds into a 7-byte timer frame.
///
/// Fails with [`ProtocolError::Range`] if `seconds` is negative or needs more
/// than 255 hours.
pub fn encode_timer(seconds: i64) -> ProtocolResult<Vec<u8>> {
    if !(0..=MAX_TIMER_SECONDS).contains(&seconds) {
        return Err(ProtocolError::Range {
            field: "timer seconds",
            value: seconds,
            max: MAX_TIMER_SECONDS,
        });
    }

    let hours = seconds / 3600;
    let minutes_and_seconds = seconds % 3600;

    let mut buf = Vec::with_capacity(TIMER_FRAME_SIZE);
    buf.put_u8(CASIO_TIMER);
    buf.put_u8(hours as u8);
    buf.put_u8((minutes_and_seconds / 60) as u8);
    buf.put_u8((minutes_and_seconds % 60) as u8);
    buf.put_bytes(0, TIMER_FRAME_SIZE - 4);
    Ok(buf)
}

/// Decode a timer frame back into seconds.
///
/// Only the tag and the three time fields are required; the reserved tail is
/// ignored.
pub fn decode_timer(frame: &[u8]) -> ProtocolResult<u32> {
    if frame.len() < 4 {
        return Err(ProtocolError::too_short(4, frame.len()));
    }
    let hours = frame[1] as u32;
    let minutes = frame[2] as u32;
    let seconds = frame[3] as u32;
    Ok(hours * 3600 + minutes * 60 + seconds)
}
