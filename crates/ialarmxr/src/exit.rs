use std::fmt;
use std::io;

use ialarmxr::transport::TransportError;
use ialarmxr::frame::FrameError;
use ialarmxr::session::SessionError;
use ialarmxr::PanelError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::ConnectTimeout { .. } => {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        SessionError::Disconnected(_) | SessionError::Rejected { .. } => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        SessionError::Pairing { .. } => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        SessionError::Message(_) | SessionError::ProtocolInvariant(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn panel_error(context: &str, err: PanelError) -> CliError {
    match err {
        PanelError::Session(err) => session_error(context, err),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ialarmxr::session::Leg;
    use std::time::Duration;

    #[test]
    fn session_errors_map_to_exit_codes() {
        let cases = [
            (SessionError::Timeout(Duration::from_secs(1)), TIMEOUT),
            (
                SessionError::Transport(TransportError::Io(io::Error::from(
                    io::ErrorKind::ConnectionRefused,
                ))),
                TRANSPORT_ERROR,
            ),
            (SessionError::Disconnected("eof".into()), FAILURE),
            (SessionError::Frame(FrameError::InvalidMarker), DATA_INVALID),
            (
                SessionError::Pairing {
                    leg: Leg::Client,
                    code: 1,
                },
                PERMISSION_DENIED,
            ),
            (
                SessionError::Rejected {
                    path: "/Root/Host/SetAlarmStatus".into(),
                    code: 2,
                },
                FAILURE,
            ),
            (SessionError::ProtocolInvariant("cap".into()), DATA_INVALID),
        ];
        for (err, code) in cases {
            let label = err.to_string();
            assert_eq!(session_error("status", err).code, code, "{label}");
        }
    }

    #[test]
    fn panel_field_errors_are_invalid_data() {
        let err = panel_error("mac", PanelError::MissingField("Mac".into()));
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "mac: panel reply is missing Mac");
    }
}
