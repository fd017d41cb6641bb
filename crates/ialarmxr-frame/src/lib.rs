//! Wire framing for the iAlarm-XR panel protocol.
//!
//! Every exchange carries one obfuscated XML payload wrapped as:
//! - A 4-byte marker (`@ieM`)
//! - 4 ASCII digits of payload length
//! - 4 ASCII digits of sequence number
//! - 4 reserved ASCII digits (`0000`)
//! - the ciphered payload
//! - the sequence number again as 4 ASCII digits
//!
//! [`codec`] works on ciphertext. [`FrameReader`] and [`FrameWriter`] apply
//! the [`cipher`] themselves so callers only ever see plaintext.

pub mod cipher;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, unwrap_frame, wrap_frame, Frame, FrameConfig, FOOTER_SIZE,
    HEADER_SIZE, MARKER, MAX_PAYLOAD, MAX_SEQUENCE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
