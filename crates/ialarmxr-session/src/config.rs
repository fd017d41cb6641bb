use std::fmt;
use std::time::Duration;

/// Vendor relay that forwards connections to registered panels.
pub const DEFAULT_HOST: &str = "47.91.74.102";
/// Panel and relay TCP port.
pub const DEFAULT_PORT: u16 = 18034;
/// Connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on list pages fetched by one [`crate::Session::request_list`] call.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Panel login. Never logged; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Panel identifier as registered with the vendor relay.
    pub uid: String,
    pub password: String,
}

impl Credentials {
    pub fn new(uid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("uid", &self.uid)
            .field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            )
            .finish()
    }
}

/// Connection settings for a [`crate::Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Bound on each blocking read and write.
    pub read_timeout: Duration,
    /// Pagination ceiling for list requests.
    pub max_pages: usize,
    /// Require every reply to carry the sequence number of its request.
    pub verify_sequence: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
            verify_sequence: false,
        }
    }
}

impl SessionConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set both the connect and the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_sequence_verification(mut self, verify: bool) -> Self {
        self.verify_sequence = verify;
        self
    }
}
