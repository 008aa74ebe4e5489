//! Connection to the push endpoint
//!
//! - `ConnectionManager`: lifecycle state machine and status text
//! - `ReconnectTimer`: fixed-delay retry with one outstanding deadline
//! - `Transport` / `Connection`: seam over the wire, `WsTransport` in production

mod manager;
mod timer;
mod transport;
mod websocket;

pub use manager::*;
pub use timer::ReconnectTimer;
pub use transport::{Connection, Transport, TransportEvent};
pub use websocket::{WsConnection, WsTransport};
