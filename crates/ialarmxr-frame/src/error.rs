/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the `@ieM` marker.
    #[error("invalid frame marker (expected \"@ieM\")")]
    InvalidMarker,

    /// Fewer bytes than a complete frame needs.
    #[error("truncated frame ({len} bytes, need {min})")]
    Truncated { len: usize, min: usize },

    /// A header or footer field is not four ASCII digits.
    #[error("malformed frame {0} field")]
    InvalidHeader(&'static str),

    /// The payload does not fit the 4-digit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The sequence number does not fit the 4-digit sequence field.
    #[error("sequence number {0} out of range (1..=9999)")]
    SequenceOutOfRange(u16),

    /// Header and footer of one frame carry different sequence numbers.
    #[error("frame sequence mismatch (header {header}, footer {footer})")]
    SequenceMismatch { header: u16, footer: u16 },

    /// The panel answered with a sequence number other than the one sent.
    #[error("unexpected frame sequence (expected {expected}, got {actual})")]
    UnexpectedSequence { expected: u16, actual: u16 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl From<ialarmxr_transport::TransportError> for FrameError {
    fn from(err: ialarmxr_transport::TransportError) -> Self {
        use ialarmxr_transport::TransportError;

        match err {
            TransportError::Io(io)
            | TransportError::Connect { source: io, .. }
            | TransportError::Resolve { source: io, .. } => FrameError::Io(io),
            timeout @ TransportError::ConnectTimeout { .. } => FrameError::Io(
                std::io::Error::new(std::io::ErrorKind::TimedOut, timeout.to_string()),
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
