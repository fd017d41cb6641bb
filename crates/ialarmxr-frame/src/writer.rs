use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use ialarmxr_transport::PanelStream;
use tracing::trace;

use crate::cipher;
use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Ciphers plaintext payloads and writes them as `@ieM` frames.
///
/// Each frame is assembled completely before the first byte is written.
pub struct FrameWriter<T> {
    inner: T,
    out: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            out: BytesMut::new(),
        }
    }

    /// Send `plaintext` as frame `seq` and flush.
    pub fn send(&mut self, seq: u16, plaintext: &[u8]) -> Result<()> {
        let mut payload = plaintext.to_vec();
        cipher::apply(&mut payload);
        self.out.clear();
        encode_frame(seq, &payload, &mut self.out)?;

        let mut rest = &self.out[..];
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.inner.flush()?;
        trace!(seq, len = payload.len(), "frame sent");
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<PanelStream> {
    /// Wrap a panel connection, applying the write timeout from `config`.
    pub fn from_stream(inner: PanelStream, config: &FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::cipher::ciphered;
    use crate::codec::{unwrap_frame, MAX_PAYLOAD};

    #[test]
    fn write_single_frame_is_ciphered() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(1, b"<Root/>").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..16], b"@ieM000700010000");
        let frame = unwrap_frame(&wire).unwrap();
        assert_eq!(frame.seq, 1);
        assert_eq!(frame.payload.as_ref(), ciphered(b"<Root/>").as_slice());
    }

    #[test]
    fn write_then_read_back() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(3, b"one").unwrap();
        writer.send(4, b"two").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = crate::reader::FrameReader::new(Cursor::new(wire));
        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        assert_eq!((f1.seq, f1.payload.as_ref()), (3, b"one".as_ref()));
        assert_eq!((f2.seq, f2.payload.as_ref()), (4, b"two".as_ref()));
    }

    #[test]
    fn payload_too_large_rejected() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.send(1, &vec![b'a'; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn short_writes_are_resumed_and_flushed() {
        let mut writer = FrameWriter::new(TrickleWriter::default());
        writer.send(12, b"<Root><Host/></Root>").unwrap();

        let sink = writer.into_inner();
        assert!(sink.flushed);
        let frame = unwrap_frame(&sink.data).unwrap();
        assert_eq!(frame.seq, 12);
        assert_eq!(ciphered(&frame.payload), b"<Root><Host/></Root>");
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        let mut writer = FrameWriter::new(ClosedWriter);
        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    /// Accepts at most three bytes per call.
    #[derive(Default)]
    struct TrickleWriter {
        data: Vec<u8>,
        flushed: bool,
    }

    impl Write for TrickleWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
