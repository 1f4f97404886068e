// ── Core error types ──
//
// Errors surfaced by pilotsync-core. Message-level failures (bad frames,
// unknown themes) are normally logged and recovered where they happen;
// these variants exist for the callers that ask explicitly.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Theme ────────────────────────────────────────────────────────
    #[error("Theme not found: {name}")]
    ThemeNotFound { name: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to backend: {reason}")]
    ConnectFailed { reason: String },

    #[error("Backend connection lost: {reason}")]
    ConnectionLost { reason: String },

    #[error("Dashboard sync is already running")]
    AlreadyStarted,

    // ── Protocol ─────────────────────────────────────────────────────
    #[error("Protocol violation: {message}")]
    Protocol { message: String },

    // ── Control requests ─────────────────────────────────────────────
    #[error("Control request failed: {message}")]
    ControlRequest {
        message: String,
        /// HTTP status code (if the backend answered).
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pilotsync_api::Error> for CoreError {
    fn from(err: pilotsync_api::Error) -> Self {
        use pilotsync_api::Error as Api;

        match err {
            Api::MalformedMessage { .. } | Api::UnknownMessageType { .. } => CoreError::Protocol {
                message: err.to_string(),
            },
            Api::ConnectFailed(reason) => CoreError::ConnectFailed { reason },
            Api::Timeout(_) => CoreError::ConnectFailed {
                reason: err.to_string(),
            },
            Api::ConnectionLost(reason) => CoreError::ConnectionLost { reason },
            Api::ChannelClosed => CoreError::ConnectionLost {
                reason: "channel task is not running".into(),
            },
            Api::Transport(e) => CoreError::ControlRequest {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Serialization(e) => CoreError::Internal(format!("Serialization error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn protocol_errors_map_to_protocol() {
        let err = CoreError::from(pilotsync_api::Error::UnknownMessageType {
            kind: "camera".into(),
        });
        assert!(matches!(err, CoreError::Protocol { ref message } if message.contains("camera")));
    }

    #[test]
    fn timeout_is_a_connect_failure() {
        let err = CoreError::from(pilotsync_api::Error::Timeout(Duration::from_secs(10)));
        match err {
            CoreError::ConnectFailed { reason } => assert!(reason.contains("10000ms")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
