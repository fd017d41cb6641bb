use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: marker (4) + length (4) + sequence (4) + reserved (4) = 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Frame footer: the sequence number repeated as 4 ASCII digits.
pub const FOOTER_SIZE: usize = 4;

/// Marker bytes: "@ieM".
pub const MARKER: [u8; 4] = *b"@ieM";

/// Reserved header field, always zero on the wire.
const RESERVED: &[u8; 4] = b"0000";

/// Largest payload the 4-digit length field can describe.
pub const MAX_PAYLOAD: usize = 9999;

/// Largest sequence number the 4-digit sequence field can carry.
pub const MAX_SEQUENCE: u16 = 9999;

/// A framed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence number carried in both header and footer.
    pub seq: u16,
    /// The message payload (ciphertext when produced by the codec functions).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(seq: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            seq,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + footer).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + FOOTER_SIZE
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────┬────────────────┬──────────┐
/// │ Marker   │ Length   │ Seq      │ Reserved │ Payload        │ Seq      │
/// │ "@ieM"   │ 4 digits │ 4 digits │ "0000"   │ (Length bytes) │ 4 digits │
/// └──────────┴──────────┴──────────┴──────────┴────────────────┴──────────┘
/// ```
pub fn encode_frame(seq: u16, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    if seq == 0 || seq > MAX_SEQUENCE {
        return Err(FrameError::SequenceOutOfRange(seq));
    }

    dst.reserve(HEADER_SIZE + payload.len() + FOOTER_SIZE);
    dst.put_slice(&MARKER);
    dst.put_slice(format!("{:04}", payload.len()).as_bytes());
    dst.put_slice(format!("{seq:04}").as_bytes());
    dst.put_slice(RESERVED);
    dst.put_slice(payload);
    dst.put_slice(format!("{seq:04}").as_bytes());
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    let marker_len = src.len().min(MARKER.len());
    if src[..marker_len] != MARKER[..marker_len] {
        return Err(FrameError::InvalidMarker);
    }

    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let payload_len = parse_digits(&src[4..8]).ok_or(FrameError::InvalidHeader("length"))?;
    let header_seq = parse_digits(&src[8..12]).ok_or(FrameError::InvalidHeader("sequence"))?;

    let total = HEADER_SIZE + payload_len + FOOTER_SIZE;
    if src.len() < total {
        return Ok(None);
    }

    let footer_at = HEADER_SIZE + payload_len;
    let footer_seq = parse_digits(&src[footer_at..footer_at + FOOTER_SIZE])
        .ok_or(FrameError::InvalidHeader("footer sequence"))?;

    // Both values are four digits, so they always fit a u16.
    let (header_seq, footer_seq) = (header_seq as u16, footer_seq as u16);
    if header_seq != footer_seq {
        return Err(FrameError::SequenceMismatch {
            header: header_seq,
            footer: footer_seq,
        });
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    src.advance(FOOTER_SIZE);

    Ok(Some(Frame {
        seq: header_seq,
        payload,
    }))
}

/// Wrap a ciphered payload into a complete frame.
pub fn wrap_frame(seq: u16, payload: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload.len() + FOOTER_SIZE);
    encode_frame(seq, payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Unwrap one complete frame received in a single buffer.
///
/// An empty buffer means the socket produced no data and is reported as
/// [`FrameError::ConnectionClosed`], never as an empty frame. Bytes after the
/// footer are ignored.
pub fn unwrap_frame(bytes: &[u8]) -> Result<Frame> {
    if bytes.is_empty() {
        return Err(FrameError::ConnectionClosed);
    }
    if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(FrameError::Truncated {
            len: bytes.len(),
            min: HEADER_SIZE + FOOTER_SIZE,
        });
    }

    let mut src = BytesMut::from(bytes);
    match decode_frame(&mut src)? {
        Some(frame) => Ok(frame),
        None => {
            let payload_len = parse_digits(&bytes[4..8]).unwrap_or_default();
            Err(FrameError::Truncated {
                len: bytes.len(),
                min: HEADER_SIZE + payload_len + FOOTER_SIZE,
            })
        }
    }
}

fn parse_digits(field: &[u8]) -> Option<usize> {
    if field.len() != 4 || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        field
            .iter()
            .fold(0usize, |acc, digit| acc * 10 + usize::from(digit - b'0')),
    )
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let wire = wrap_frame(7, b"abc").unwrap();
        assert_eq!(wire.as_ref(), b"@ieM000300070000abc0007");
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        for (seq, payload) in [(1u16, &b""[..]), (42, &b"hello"[..]), (9999, &[0xAB; 512][..])] {
            let wire = wrap_frame(seq, payload).unwrap();
            let frame = unwrap_frame(&wire).unwrap();
            assert_eq!(frame.seq, seq);
            assert_eq!(frame.payload.as_ref(), payload);
            assert_eq!(frame.wire_size(), wire.len());
        }
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&b"@ieM00"[..]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let wire = wrap_frame(1, b"hello").unwrap();
        let mut buf = BytesMut::from(&wire[..HEADER_SIZE + 2]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_invalid_marker() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 400"[..]);
        assert!(matches!(
            decode_frame(&mut buf),
            Err(FrameError::InvalidMarker)
        ));
    }

    #[test]
    fn test_partial_marker_mismatch_fails_early() {
        let mut buf = BytesMut::from(&b"@x"[..]);
        assert!(matches!(
            decode_frame(&mut buf),
            Err(FrameError::InvalidMarker)
        ));
    }

    #[test]
    fn test_non_digit_length() {
        let mut buf = BytesMut::from(&b"@ieM00x100010000"[..]);
        assert!(matches!(
            decode_frame(&mut buf),
            Err(FrameError::InvalidHeader("length"))
        ));
    }

    #[test]
    fn test_header_footer_sequence_mismatch() {
        let mut buf = BytesMut::from(&b"@ieM000200030000ab0004"[..]);
        assert!(matches!(
            decode_frame(&mut buf),
            Err(FrameError::SequenceMismatch {
                header: 3,
                footer: 4
            })
        ));
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(1, b"first", &mut buf).unwrap();
        encode_frame(2, b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!((f1.seq, f1.payload.as_ref()), (1, b"first".as_ref()));
        let f2 = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!((f2.seq, f2.payload.as_ref()), (2, b"second".as_ref()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        assert!(matches!(
            wrap_frame(1, &payload),
            Err(FrameError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_sequence_out_of_range() {
        assert!(matches!(
            wrap_frame(0, b"x"),
            Err(FrameError::SequenceOutOfRange(0))
        ));
        assert!(matches!(
            wrap_frame(10_000, b"x"),
            Err(FrameError::SequenceOutOfRange(10_000))
        ));
    }

    #[test]
    fn test_unwrap_empty_is_connection_failure() {
        assert!(matches!(
            unwrap_frame(&[]),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_unwrap_short_buffer() {
        assert!(matches!(
            unwrap_frame(b"@ieM0001"),
            Err(FrameError::Truncated { len: 8, min: 20 })
        ));
        assert!(matches!(
            unwrap_frame(b"@ieM000900010000ab0001"),
            Err(FrameError::Truncated { min: 29, .. })
        ));
    }

    #[test]
    fn test_unwrap_ignores_trailing_bytes() {
        let mut wire = wrap_frame(5, b"xml").unwrap().to_vec();
        wire.extend_from_slice(b"garbage");
        let frame = unwrap_frame(&wire).unwrap();
        assert_eq!(frame.payload.as_ref(), b"xml");
    }
}
