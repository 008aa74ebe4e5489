//! Connection lifecycle state machine
//!
//! The manager reacts to lifecycle events reported by the transport loop and
//! owns the status string and the reconnect timer. It never performs I/O.

use std::fmt;

use tracing::{debug, info, warn};

use super::timer::ReconnectTimer;
use crate::config::EndpointSettings;
use crate::render::StatusSurface;
use crate::snapshot::Snapshot;

pub const STATUS_CONNECTING: &str = "Connecting...";
pub const STATUS_CONNECTED: &str = "Connected";
pub const STATUS_RECONNECTING: &str = "Connection closed, reconnecting...";
pub const STATUS_ERROR: &str = "Connection error";

// ─────────────────────────────────────────────────────────────────
// Connection State
// ─────────────────────────────────────────────────────────────────

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and none being attempted
    #[default]
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Open and receiving snapshots
    Connected,
    /// Transport reported an error; a close follows
    Errored,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Errored => "errored",
        };
        write!(f, "{}", s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Connection Manager
// ─────────────────────────────────────────────────────────────────

/// Owns the lifecycle of the single connection to the push endpoint
pub struct ConnectionManager<S: StatusSurface> {
    state: ConnectionState,
    status: String,
    surface: S,
    timer: ReconnectTimer,
    reconnect_attempts: u32,
    messages_received: u64,
    decode_failures: u64,
}

impl<S: StatusSurface> ConnectionManager<S> {
    pub fn new(config: &EndpointSettings, surface: S) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            status: String::new(),
            surface,
            timer: ReconnectTimer::new(config.reconnect_delay()),
            reconnect_attempts: 0,
            messages_received: 0,
            decode_failures: 0,
        }
    }

    /// First connection attempt
    pub fn start(&mut self) {
        self.transition(ConnectionState::Connecting);
        self.set_status(STATUS_CONNECTING);
    }

    /// The reconnect delay elapsed; a new attempt begins. The status text
    /// keeps showing the reconnecting message until the attempt resolves.
    pub fn begin_reconnect(&mut self) {
        info!(attempt = self.reconnect_attempts, "Reconnecting");
        self.transition(ConnectionState::Connecting);
    }

    pub fn on_open(&mut self) {
        info!("Connection established");
        self.transition(ConnectionState::Connected);
        self.set_status(STATUS_CONNECTED);
    }

    /// Decode an inbound payload. Returns the snapshot to render, or `None`
    /// when the payload is dropped.
    pub fn on_message(&mut self, payload: &[u8]) -> Option<Snapshot> {
        if self.state != ConnectionState::Connected {
            debug!(state = %self.state, "Ignoring message outside an open connection");
            return None;
        }

        self.messages_received += 1;

        match Snapshot::from_json_bytes(payload) {
            Ok(snapshot) => {
                debug!(bytes = payload.len(), "Snapshot received");
                Some(snapshot)
            }
            Err(e) => {
                self.decode_failures += 1;
                warn!(error = %e.format_for_log(), bytes = payload.len(), "Dropping undecodable message");
                None
            }
        }
    }

    pub fn on_error(&mut self, message: &str) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                warn!(error = %message, "Connection error");
                self.transition(ConnectionState::Errored);
                self.set_status(STATUS_ERROR);
            }
            state => {
                debug!(state = %state, error = %message, "Ignoring error in current state");
            }
        }
    }

    /// The connection closed for any reason. Schedules one reconnect; a close
    /// while a reconnect is already pending does not add another.
    pub fn on_close(&mut self, reason: &str) {
        info!(reason = %reason, "Connection closed");
        self.transition(ConnectionState::Disconnected);
        self.set_status(STATUS_RECONNECTING);

        if self.timer.schedule() {
            self.reconnect_attempts += 1;
        }
    }

    /// Stop reconnecting
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        info!(
            messages = self.messages_received,
            decode_failures = self.decode_failures,
            "Connection manager stopped"
        );
    }

    /// Resolves when a scheduled reconnect is due
    pub async fn wait_for_reconnect(&mut self) {
        self.timer.fired().await
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn reconnect_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Connection state change");
            self.state = next;
        }
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.surface.set_status(text);
    }
}
