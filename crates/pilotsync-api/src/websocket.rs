//! Backend channel with auto-reconnect.
//!
//! Connects to the dashboard backend's WebSocket, validates every text
//! frame as an [`Envelope`], and delivers envelopes together with
//! lifecycle transitions through one ordered [`mpsc`] queue. A single
//! background task supervises the connection: connect, read until the
//! connection drops, back off, reconnect. It never gives up on its own;
//! only [`WebSocketHandle::close`] stops it.
//!
//! # Example
//!
//! ```rust,ignore
//! use pilotsync_api::websocket::{ChannelEvent, ReconnectConfig, WebSocketHandle};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:8000")?;
//! let mut handle = WebSocketHandle::connect(url, ReconnectConfig::default(), CancellationToken::new())?;
//!
//! while let Some(event) = handle.next_event().await {
//!     if let ChannelEvent::Message(envelope) = event {
//!         println!("{}", envelope.message_type());
//!     }
//! }
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::protocol::Envelope;

// ── Channel capacities ───────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;
const OUTBOUND_CHANNEL_CAPACITY: usize = 32;

// ── ChannelEvent ─────────────────────────────────────────────────────

/// Everything the channel reports, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A connection attempt is starting. `attempt` counts consecutive
    /// attempts since the last successful open, starting at 1.
    Connecting { attempt: u32 },
    /// The channel is open.
    Connected,
    /// The attempt failed or the open channel was lost.
    Disconnected { reason: String, retry_in: Duration },
    /// A validated inbound envelope.
    Message(Envelope),
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Backoff and liveness tuning for the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay after the first failure, and after any lost connection. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// How long a single connect (TCP + handshake) may take. Default: 10s.
    pub connect_timeout: Duration,

    /// How often to ping an open channel. Default: 15s.
    pub ping_interval: Duration,

    /// An open channel with no inbound frame for this long is treated
    /// as lost. Default: 45s.
    pub idle_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(45),
        }
    }
}

// ── Backoff ──────────────────────────────────────────────────────────

/// Exponential backoff without jitter.
///
/// `delay = min(initial * 2^failures, max)`. Consecutive failures never
/// shrink the delay; [`reset`](Self::reset) drops it back to `initial`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        let factor = 2_u32.saturating_pow(self.failures);
        self.failures = self.failures.saturating_add(1);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Forget past failures after a successful open.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl From<&ReconnectConfig> for Backoff {
    fn from(config: &ReconnectConfig) -> Self {
        Self::new(config.initial_delay, config.max_delay)
    }
}

// ── WebSocketHandle ──────────────────────────────────────────────────

/// Handle to a running backend channel.
///
/// Owns the receiving end of the event queue; there is exactly one
/// consumer, so envelopes are observed strictly in arrival order.
pub struct WebSocketHandle {
    events: mpsc::Receiver<ChannelEvent>,
    outbound: mpsc::Sender<Envelope>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WebSocketHandle {
    /// Spawn the supervisor task for `url` and return immediately.
    ///
    /// The first connection attempt happens asynchronously; its progress
    /// shows up as [`ChannelEvent`]s.
    pub fn connect(
        url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::ConnectFailed(format!(
                "unsupported scheme '{}' (expected ws or wss)",
                url.scheme()
            )));
        }

        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            ws_loop(url, event_tx, outbound_rx, reconnect, task_cancel).await;
        });

        Ok(Self {
            events,
            outbound,
            cancel,
            task,
        })
    }

    /// Wait for the next event. Returns `None` once the channel is closed.
    ///
    /// Nothing is delivered after [`close`](Self::close), including
    /// events that were already queued.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Queue an envelope for the backend.
    ///
    /// Envelopes queued while disconnected go out after the next open.
    pub async fn send(&self, envelope: Envelope) -> Result<(), Error> {
        self.outbound
            .send(envelope)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// A sender that outlives borrows of the handle.
    pub fn sender(&self) -> mpsc::Sender<Envelope> {
        self.outbound.clone()
    }

    /// Stop the supervisor and any further delivery.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Close and wait for the background task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "channel task ended abnormally");
        }
    }
}

// ── Supervisor loop ──────────────────────────────────────────────────

/// Main loop: connect → read → on loss, backoff → reconnect.
async fn ws_loop(
    url: Url,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut outbound_rx: mpsc::Receiver<Envelope>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut backoff = Backoff::from(&reconnect);

    loop {
        let attempt = backoff.failures() + 1;
        if event_tx
            .send(ChannelEvent::Connecting { attempt })
            .await
            .is_err()
        {
            break;
        }

        let result = connect_and_read(
            &url,
            &event_tx,
            &mut outbound_rx,
            &reconnect,
            &cancel,
            &mut backoff,
        )
        .await;

        let err = match result {
            // Cancelled, or nobody is listening anymore.
            Ok(()) => break,
            Err(e) => e,
        };

        let delay = backoff.next_delay();
        tracing::warn!(
            error = %err,
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Channel down, waiting before reconnect"
        );

        let event = ChannelEvent::Disconnected {
            reason: err.to_string(),
            retry_in: delay,
        };
        if event_tx.send(event).await.is_err() {
            break;
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!("Channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one connection and pump it until it drops.
///
/// `Ok(())` means the loop should stop (cancelled or consumer gone);
/// any `Err` feeds the backoff.
async fn connect_and_read(
    url: &Url,
    event_tx: &mpsc::Sender<ChannelEvent>,
    outbound_rx: &mut mpsc::Receiver<Envelope>,
    reconnect: &ReconnectConfig,
    cancel: &CancellationToken,
    backoff: &mut Backoff,
) -> Result<(), Error> {
    tracing::info!(url = %url, "Connecting to backend channel");

    let connect = tokio::time::timeout(
        reconnect.connect_timeout,
        tokio_tungstenite::connect_async(url.as_str()),
    );
    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        result = connect => result
            .map_err(|_| Error::Timeout(reconnect.connect_timeout))?
            .map_err(|e| Error::ConnectFailed(e.to_string()))?,
    };

    tracing::info!("Backend channel connected");
    backoff.reset();
    if event_tx.send(ChannelEvent::Connected).await.is_err() {
        return Ok(());
    }

    let (mut write, mut read) = ws_stream.split();

    let mut ping = tokio::time::interval(reconnect.ping_interval);
    ping.tick().await; // consume the immediate first tick
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        last_seen = Instant::now();
                        let Some(envelope) = parse_frame(&text) else { continue };
                        if event_tx.send(ChannelEvent::Message(envelope)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = match frame {
                            Some(cf) => {
                                format!("closed by backend (code {}): {}", cf.code, cf.reason)
                            }
                            None => "closed by backend".to_owned(),
                        };
                        return Err(Error::ConnectionLost(reason));
                    }
                    Some(Ok(other)) => {
                        // Ping/Pong/Binary: proof of life, nothing to apply.
                        last_seen = Instant::now();
                        tracing::trace!(kind = frame_kind(&other), "Channel control frame");
                    }
                    Some(Err(e)) => return Err(Error::ConnectionLost(e.to_string())),
                    None => return Err(Error::ConnectionLost("stream ended".into())),
                }
            }
            Some(envelope) = outbound_rx.recv() => {
                let text = match envelope.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping unserializable outbound envelope");
                        continue;
                    }
                };
                tracing::debug!(message_type = %envelope.message_type(), "Sending envelope");
                write
                    .send(Message::text(text))
                    .await
                    .map_err(|e| Error::ConnectionLost(e.to_string()))?;
            }
            _ = ping.tick() => {
                let idle = last_seen.elapsed();
                if idle >= reconnect.idle_timeout {
                    return Err(Error::ConnectionLost(format!(
                        "no frames for {}ms",
                        idle.as_millis()
                    )));
                }
                write
                    .send(Message::Ping(Default::default()))
                    .await
                    .map_err(|e| Error::ConnectionLost(e.to_string()))?;
            }
        }
    }
}

// ── Frame handling ───────────────────────────────────────────────────

/// Validate a text frame, logging and discarding anything malformed.
fn parse_frame(text: &str) -> Option<Envelope> {
    match Envelope::parse(text) {
        Ok(envelope) => {
            tracing::trace!(message_type = %envelope.message_type(), "Envelope received");
            Some(envelope)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dropping inbound frame");
            None
        }
    }
}

fn frame_kind(message: &Message) -> &'static str {
    match message {
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Binary(_) => "binary",
        Message::Text(_) => "text",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}

// ── Tests ────────────────────────────────────────────────────────────
