//! twb-monitor - live status client for the tribal wars bot
//!
//! Keeps a WebSocket open to the bot's push endpoint and renders every
//! village snapshot it receives. The connection recovers on its own after
//! any failure, retrying on a fixed delay.

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod render;
pub mod snapshot;
pub mod version;

pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use monitor::Monitor;
