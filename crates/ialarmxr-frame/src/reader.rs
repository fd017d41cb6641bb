use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use ialarmxr_transport::PanelStream;
use tracing::trace;

use crate::cipher;
use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Panels answer in a single segment well under this size.
const RECV_SIZE: usize = 1024;

/// Pulls `@ieM` frames off a byte stream and strips the keystream.
///
/// Bytes are accumulated until [`decode_frame`] sees a whole frame, so short
/// reads are invisible to callers. Payloads come back as plaintext.
pub struct FrameReader<T> {
    inner: T,
    pending: BytesMut,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(2 * RECV_SIZE),
        }
    }

    /// Block until one whole frame is buffered and return it deciphered.
    ///
    /// End of stream, before or inside a frame, is
    /// [`FrameError::ConnectionClosed`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        let mut chunk = [0u8; RECV_SIZE];
        loop {
            if let Some(Frame { seq, payload }) = decode_frame(&mut self.pending)? {
                let mut plain = payload.to_vec();
                cipher::apply(&mut plain);
                trace!(seq, len = plain.len(), "frame received");
                return Ok(Frame::new(seq, plain));
            }

            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// [`FrameReader::read_frame`], failing unless the reply carries `expected`.
    pub fn read_frame_expecting(&mut self, expected: u16) -> Result<Frame> {
        let frame = self.read_frame()?;
        match frame.seq {
            actual if actual == expected => Ok(frame),
            actual => Err(FrameError::UnexpectedSequence { expected, actual }),
        }
    }

    /// Drop buffered bytes that did not form a frame.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<PanelStream> {
    /// Wrap a panel connection, applying the read timeout from `config`.
    pub fn from_stream(inner: PanelStream, config: &FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::new(inner))
    }
}
