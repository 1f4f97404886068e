use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `pilotsync-api` crate.
///
/// Covers the inbound channel (framing, envelope validation, connection
/// lifecycle) and the outbound control requests. `pilotsync-core` maps
/// these into its own [`CoreError`](../pilotsync_core/enum.CoreError.html).
#[derive(Debug, Error)]
pub enum Error {
    // ── Protocol ────────────────────────────────────────────────────
    /// Frame is not a valid envelope: bad JSON, missing/mismatched
    /// payload field, or a payload that does not fit its domain shape.
    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    /// Envelope `type` discriminant is not one of the known domains.
    #[error("Unknown message type: {kind}")]
    UnknownMessageType { kind: String },

    // ── Channel lifecycle ───────────────────────────────────────────
    /// Could not open the channel (refused, handshake failure, bad URI).
    #[error("Channel connect failed: {0}")]
    ConnectFailed(String),

    /// An open channel dropped without the caller asking for it.
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    /// Opening the channel did not finish in time.
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The background channel task is gone; nothing can be sent.
    #[error("Channel task is not running")]
    ChannelClosed,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error on a control request.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// Serializing an outbound envelope failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the backend could not be reached at all, as
    /// opposed to answering with an error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ConnectFailed(_) | Self::ConnectionLost(_) | Self::Timeout(_) => true,
            _ => false,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }
}
