use std::time::Duration;

use crate::handshake::Leg;

/// Errors that can occur in session operations.
///
/// Every variant except [`SessionError::Message`] raised while building a
/// request leaves the session disconnected; the next call reconnects and
/// pairs again. Nothing is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Connect or read did not complete within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level error (refused, reset, unresolvable).
    #[error("transport error: {0}")]
    Transport(#[from] ialarmxr_transport::TransportError),

    /// The panel closed the connection or sent nothing.
    #[error("panel disconnected: {0}")]
    Disconnected(String),

    /// Frame-level protocol violation.
    #[error("frame error: {0}")]
    Frame(ialarmxr_frame::FrameError),

    /// Request or response document error.
    #[error("message error: {0}")]
    Message(#[from] ialarmxr_message::MessageError),

    /// A handshake leg answered with a non-zero error code.
    #[error("pairing failed at {leg} (error code {code:02})")]
    Pairing { leg: Leg, code: u8 },

    /// A command was answered with a non-zero error code.
    #[error("panel rejected {path} (error code {code:02})")]
    Rejected { path: String, code: u8 },

    /// The panel broke a protocol rule the client relies on.
    #[error("protocol invariant violated: {0}")]
    ProtocolInvariant(String),
}

impl SessionError {
    /// Whether this error is a transport timeout rather than a refusal or reset.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout(_))
    }

    pub(crate) fn from_frame(err: ialarmxr_frame::FrameError, timeout: Duration) -> Self {
        use ialarmxr_frame::FrameError;

        match err {
            FrameError::Io(io) if ialarmxr_transport::error::is_timeout_kind(io.kind()) => {
                SessionError::Timeout(timeout)
            }
            FrameError::Io(io) => SessionError::Transport(io.into()),
            FrameError::ConnectionClosed => {
                SessionError::Disconnected("connection closed, received no reply".to_string())
            }
            other => SessionError::Frame(other),
        }
    }

    pub(crate) fn from_connect(
        err: ialarmxr_transport::TransportError,
        timeout: Duration,
    ) -> Self {
        if err.is_timeout() {
            SessionError::Timeout(timeout)
        } else {
            SessionError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
