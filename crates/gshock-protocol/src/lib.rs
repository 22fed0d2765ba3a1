//! G-Shock BLE Companion Protocol
//!
//! This crate provides the constants and byte codecs used to talk to a Casio
//! G-Shock watch over its "all features" GATT characteristic. Every message on
//! the wire starts with a one-byte tag naming the feature it belongs to; the
//! rest of the frame is a fixed-layout, feature-specific payload.
//!
//! # Protocol Overview
//!
//! - **Requests** (host → watch): the feature tag written alone to the
//!   read-request handle asks the watch to report that feature's state.
//! - **Writes** (host → watch): a full frame written to the all-features
//!   handle updates that feature on the watch.
//! - **Notifications** (watch → host): frames arrive on the all-features
//!   characteristic, tagged with the feature they describe.
//!
//! # Example
//!
//! ```rust
//! use gshock_protocol::{decode_timer, encode_timer};
//!
//! let frame = encode_timer(150).unwrap();
//! assert_eq!(decode_timer(&frame).unwrap(), 150);
//! ```

mod alarms;
mod clock;
mod constants;
mod error;
mod text;
mod timer;
mod types;

pub use alarms::*;
pub use clock::*;
pub use constants::*;
pub use error::*;
pub use text::*;
pub use timer::*;
pub use types::*;
