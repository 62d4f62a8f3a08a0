//! Connection Manager
//!
//! Holds the WebSocket to the dev server for the lifetime of the client.
//! After the server's `connected` message a keep-alive sentinel goes out on
//! a fixed interval so proxies don't reap the idle socket. Each update
//! record is handed to the dispatcher as its own local task; the read loop
//! never waits on a fetch.
//!
//! There is no reconnect: [`HmrClient::run`] returns when the server closes
//! the socket or the transport fails.

mod message;

pub use message::{decode_message, ServerMessage};

use crate::error::{Error, Result};
use crate::hmr::{ModuleLoader, Update};
use crate::runtime::HotRuntime;
use futures_util::{SinkExt, StreamExt};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request};
use tokio_tungstenite::tungstenite::Message;

/// Update channel client
pub struct HmrClient<L> {
    runtime: Rc<HotRuntime<L>>,
    url: String,
    protocol: String,
    heartbeat_interval: Duration,
    heartbeat_message: String,
}

impl<L: ModuleLoader + 'static> HmrClient<L> {
    pub fn new(runtime: Rc<HotRuntime<L>>) -> Self {
        let config = runtime.config().clone();
        Self {
            url: config.server_url.clone(),
            protocol: config.protocol.clone(),
            heartbeat_interval: config.heartbeat_interval(),
            heartbeat_message: config.heartbeat_message,
            runtime,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn runtime(&self) -> &Rc<HotRuntime<L>> {
        &self.runtime
    }

    fn request(&self) -> Result<Request<()>> {
        let mut request = self.url.as_str().into_client_request()?;
        let protocol = HeaderValue::from_str(&self.protocol)
            .map_err(|e| Error::Config(format!("invalid protocol token: {}", e)))?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, protocol);
        Ok(request)
    }

    /// Connect and process messages until the connection ends.
    ///
    /// Dispatches are spawned with [`tokio::task::spawn_local`], so this
    /// must be polled inside a [`tokio::task::LocalSet`]. A zero keep-alive
    /// interval is rejected with [`Error::Config`] before connecting.
    pub async fn run(&self) -> Result<()> {
        if self.heartbeat_interval.is_zero() {
            return Err(Error::Config(
                "keep-alive interval must be greater than 0".to_string(),
            ));
        }
        tracing::info!("connecting...");
        let (stream, _) = connect_async(self.request()?).await?;
        let (mut write, mut read) = stream.split();
        let mut heartbeat: Option<Interval> = None;

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if self.handle_text(text.as_str()) && heartbeat.is_none() {
                            heartbeat = Some(self.heartbeat());
                        }
                    }
                    Some(Ok(Message::Binary(bin))) => {
                        tracing::debug!(len = bin.len(), "ignoring binary frame");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "server closed the connection");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("connection failed: {}", e);
                        return Err(e.into());
                    }
                    None => break,
                },
                _ = next_tick(&mut heartbeat) => {
                    let ping = Message::text(self.heartbeat_message.clone());
                    if let Err(e) = write.send(ping).await {
                        tracing::warn!("keep-alive failed, stopping it: {}", e);
                        heartbeat = None;
                    }
                }
            }
        }

        tracing::info!("connection closed");
        Ok(())
    }

    /// Handle one text frame; returns true on the `connected` signal.
    ///
    /// Decode failures are logged and otherwise ignored.
    pub fn handle_text(&self, text: &str) -> bool {
        match decode_message(text) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                tracing::error!("failed to decode server message: {}", e);
                false
            }
        }
    }

    pub fn handle_message(&self, message: ServerMessage) -> bool {
        match message {
            ServerMessage::Connected => {
                tracing::info!("connected.");
                true
            }
            ServerMessage::Update { updates } => {
                for update in updates {
                    self.spawn_dispatch(update);
                }
                false
            }
        }
    }

    fn spawn_dispatch(&self, update: Update) {
        let dispatcher = self.runtime.dispatcher();
        tokio::task::spawn_local(async move {
            dispatcher.dispatch(&update).await;
        });
    }

    fn heartbeat(&self) -> Interval {
        let mut interval = tokio::time::interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}

async fn next_tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
