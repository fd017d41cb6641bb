use std::time::Duration;

/// Errors that can occur while establishing or using a panel connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The panel address could not be resolved.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to connect to the panel (refused, unreachable, reset).
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// The connect attempt did not complete within the timeout.
    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// An I/O error occurred on an established stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error represents an expired timeout rather than a refusal.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::ConnectTimeout { .. } => true,
            TransportError::Connect { source, .. } | TransportError::Io(source) => {
                is_timeout_kind(source.kind())
            }
            TransportError::Resolve { .. } => false,
        }
    }
}

/// Blocking sockets report an expired read timeout as `WouldBlock` on Unix
/// and `TimedOut` on Windows.
pub fn is_timeout_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

pub type Result<T> = std::result::Result<T, TransportError>;
