//! Live monitor event loop
//!
//! Drives the transport, the connection manager and the renderer from a
//! single task. Every lifecycle event is handled to completion before the
//! next one is awaited, so rendering never interleaves with state changes.

use std::future::Future;

use tracing::{info, warn};
use url::Url;

use crate::config::MonitorConfig;
use crate::connection::{Connection, ConnectionManager, Transport, TransportEvent};
use crate::error::{Error, Result};
use crate::render::{DisplaySurface, Renderer, StatusSurface};

/// Notice shown in place of the village display when the endpoint cannot be
/// served by the transport
pub const UNSUPPORTED_NOTICE: &str = "Live updates are not supported";

/// One step of the event loop
enum LoopEvent {
    Opened(Box<dyn Connection>),
    ConnectFailed(Error),
    Transport(TransportEvent),
    ReconnectDue,
}

/// Live view of the bot's villages
pub struct Monitor<T: Transport, S: StatusSurface, D: DisplaySurface> {
    transport: T,
    url: Url,
    manager: ConnectionManager<S>,
    renderer: Renderer<D>,
    connection: Option<Box<dyn Connection>>,
    connect_due: bool,
}

impl<T, S, D> Monitor<T, S, D>
where
    T: Transport,
    S: StatusSurface,
    D: DisplaySurface,
{
    pub fn new(config: &MonitorConfig, transport: T, status: S, display: D) -> Result<Self> {
        let url = config.endpoint.resolve_url()?;

        Ok(Self {
            transport,
            url,
            manager: ConnectionManager::new(&config.endpoint, status),
            renderer: Renderer::new(display),
            connection: None,
            connect_due: false,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn manager(&self) -> &ConnectionManager<S> {
        &self.manager
    }

    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }

    /// Run until Ctrl+C
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
    }

    /// Run until `shutdown` resolves. Connection failures are retried
    /// indefinitely and never end the loop.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if let Err(e) = self.transport.check_support(&self.url) {
            warn!(url = %self.url, error = %e, "Transport unsupported, not connecting");
            self.renderer
                .show_notice(&format!("{}: {}", UNSUPPORTED_NOTICE, e));
            shutdown.await;
            return Ok(());
        }

        info!(url = %self.url, "Monitor started");
        self.manager.start();
        self.connect_due = true;

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.next_event() => event,
            };
            self.handle(event);
        }

        self.manager.shutdown();
        self.connection = None;
        info!(frames = self.renderer.frames(), "Monitor stopped");
        Ok(())
    }

    async fn next_event(&mut self) -> LoopEvent {
        if self.connect_due {
            self.connect_due = false;
            return match self.transport.connect(&self.url).await {
                Ok(connection) => LoopEvent::Opened(connection),
                Err(e) => LoopEvent::ConnectFailed(e),
            };
        }

        match self.connection.as_mut() {
            Some(connection) => LoopEvent::Transport(connection.next_event().await),
            None => {
                self.manager.wait_for_reconnect().await;
                LoopEvent::ReconnectDue
            }
        }
    }

    fn handle(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Opened(connection) => {
                self.connection = Some(connection);
                self.manager.on_open();
            }
            LoopEvent::ConnectFailed(e) => {
                warn!(error = %e.format_for_log(), "Connect attempt failed");
                self.manager.on_error(&e.to_string());
                self.manager.on_close("connect failed");
            }
            LoopEvent::Transport(TransportEvent::Message(payload)) => {
                if let Some(snapshot) = self.manager.on_message(&payload) {
                    self.renderer.render(&snapshot);
                }
            }
            LoopEvent::Transport(TransportEvent::Error(message)) => {
                self.manager.on_error(&message);
            }
            LoopEvent::Transport(TransportEvent::Closed(reason)) => {
                self.connection = None;
                self.manager.on_close(&reason);
            }
            LoopEvent::ReconnectDue => {
                self.manager.begin_reconnect();
                self.connect_due = true;
            }
        }
    }
}
