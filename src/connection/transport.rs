//! Transport seam between the connection loop and the wire

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// What an open connection reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Application payload, text or binary
    Message(Vec<u8>),
    /// Transport-level failure; a `Closed` always follows
    Error(String),
    /// Connection is gone
    Closed(String),
}

/// Opens connections to the push endpoint
#[async_trait]
pub trait Transport: Send {
    /// Fail when this transport cannot serve the URL at all
    fn check_support(&self, url: &Url) -> Result<()>;

    async fn connect(&mut self, url: &Url) -> Result<Box<dyn Connection>>;
}

/// One open connection
#[async_trait]
pub trait Connection: Send {
    /// Next lifecycle event. Protocol frames such as pings are handled
    /// internally and never surface here.
    async fn next_event(&mut self) -> TransportEvent;
}
