//! Text-carrying frames: the watch name and reminder titles.

use crate::constants::*;
use crate::error::*;

/// Bytes the watch uses to pad unused text positions.
fn is_padding(byte: &u8) -> bool {
    *byte == 0x00 || *byte == 0xFF
}

fn padded_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(is_padding).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

fn expect_tag(frame: &[u8], expected: u8, min_len: usize) -> ProtocolResult<()> {
    if frame.len() < min_len {
        return Err(ProtocolError::too_short(min_len, frame.len()));
    }
    if frame[0] != expected {
        return Err(ProtocolError::UnexpectedTag {
            expected,
            actual: frame[0],
        });
    }
    Ok(())
}

/// Decode the watch model name, e.g. `CASIO GW-B5600`.
pub fn decode_watch_name(frame: &[u8]) -> ProtocolResult<String> {
    expect_tag(frame, CASIO_WATCH_NAME, 1)?;
    Ok(padded_text(&frame[1..]))
}

/// A reminder title as reported by the watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTitle {
    /// Reminder slot, starting at 1.
    pub index: u8,
    /// Title text with padding removed.
    pub title: String,
}

/// Decode a reminder-title frame: `0x30 | index | title...`.
pub fn decode_reminder_title(frame: &[u8]) -> ProtocolResult<ReminderTitle> {
    expect_tag(frame, CASIO_REMINDER_TITLE, 2)?;
    Ok(ReminderTitle {
        index: frame[1],
        title: padded_text(&frame[2..]),
    })
}
