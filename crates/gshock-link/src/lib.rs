//! G-Shock Companion Link
//!
//! The protocol layer between an application's action vocabulary
//! (`"SET_TIMER"`, `"GET_ALARMS"`, ...) and a notification-driven BLE
//! transport.
//!
//! - Outbound, the [`Dispatcher`] looks an action up in its routing table
//!   and hands the message to the feature's sender, which encodes it and
//!   writes it through the [`Connection`].
//! - Inbound, every notification frame is routed by its leading
//!   characteristic id to the feature's receiver. Ids nobody claims go to
//!   the unknown handler; they are expected, not errors.
//! - Correlated reads (the timer, the watch name) register a
//!   [`CompletionHandle`] in the [`PendingRegistry`]; the matching inbound
//!   frame resolves it later.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gshock_link::{Dispatcher, LinkConfig, GET_TIMER, SET_TIMER};
//! use serde_json::json;
//!
//! let dispatcher = Arc::new(Dispatcher::from_config(&LinkConfig::default())?);
//! dispatcher.attach(&conn).await?;
//!
//! dispatcher.dispatch_outbound(&conn, SET_TIMER, &json!({"value": 150})).await?;
//!
//! let handle = dispatcher.request(&conn, GET_TIMER).await?;
//! let seconds = dispatcher.await_reply(handle).await?;
//! ```

mod config;
mod connection;
mod dispatcher;
mod error;
pub mod features;
pub mod metric_defs;
mod registry;
mod types;

pub use config::*;
pub use connection::*;
pub use dispatcher::*;
pub use error::*;
pub use features::{Dispatched, Feature, Received};
pub use registry::*;
pub use types::*;
