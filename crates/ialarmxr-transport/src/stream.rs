use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{is_timeout_kind, Result, TransportError};

/// A connected panel stream. Implements `Read + Write`.
///
/// The stream is exclusively owned by one session; it is never shared or
/// pooled. Dropping it closes the socket.
pub struct PanelStream {
    inner: TcpStream,
    peer: SocketAddr,
}

impl Read for PanelStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for PanelStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl PanelStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(inner: TcpStream) -> Result<Self> {
        let peer = inner.peer_addr()?;
        Ok(Self { inner, peer })
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            inner: self.inner.try_clone()?,
            peer: self.peer,
        })
    }

    /// Remote address of the panel.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Shut down both halves of the connection.
    ///
    /// Errors are ignored: the peer may already have gone away.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown(Shutdown::Both);
    }
}

impl std::fmt::Debug for PanelStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelStream")
            .field("peer", &self.peer)
            .finish()
    }
}

/// Connect to a panel with a bounded connect timeout.
///
/// Every resolved address is tried in order; the last failure is reported.
pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<PanelStream> {
    let addr = format!("{host}:{port}");
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            addr: addr.clone(),
            source,
        })?
        .collect();

    if candidates.is_empty() {
        return Err(TransportError::Resolve {
            addr,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses resolved",
            ),
        });
    }

    let mut last_err = None;
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                debug!(peer = %candidate, "connected to panel");
                let _ = stream.set_nodelay(true);
                return PanelStream::from_tcp(stream);
            }
            Err(source) if is_timeout_kind(source.kind()) => {
                debug!(peer = %candidate, ?timeout, "connect timed out");
                last_err = Some(TransportError::ConnectTimeout {
                    addr: addr.clone(),
                    timeout,
                });
            }
            Err(source) => {
                debug!(peer = %candidate, error = %source, "connect failed");
                last_err = Some(TransportError::Connect {
                    addr: addr.clone(),
                    source,
                });
            }
        }
    }

    Err(last_err.unwrap_or(TransportError::Connect {
        addr,
        source: std::io::Error::from(std::io::ErrorKind::NotConnected),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connect_and_exchange_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).unwrap();
            socket.write_all(&buf).unwrap();
        });

        let mut stream = connect("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        stream.write_all(b"hello").unwrap();
        let mut echoed = [0u8; 5];
        stream.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"hello");
        assert_eq!(stream.peer_addr().port(), port);

        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_not_a_timeout() {
        // Bind then drop to obtain a port with nothing listening.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = connect("127.0.0.1", port, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
        assert!(!err.is_timeout());
    }

    #[test]
    fn read_timeout_surfaces_as_timeout_kind() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(200));
            drop(socket);
        });

        let mut stream = connect("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let mut buf = [0u8; 1];
        let err = stream.read(&mut buf).unwrap_err();
        assert!(TransportError::Io(err).is_timeout());

        server.join().unwrap();
    }

    #[test]
    fn debug_shows_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let _ = listener.accept().unwrap();
        });
        let stream = connect("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        assert!(format!("{stream:?}").contains("PanelStream"));
        let clone = stream.try_clone().unwrap();
        assert_eq!(clone.peer_addr(), stream.peer_addr());
        stream.shutdown();
        server.join().unwrap();
    }
}
