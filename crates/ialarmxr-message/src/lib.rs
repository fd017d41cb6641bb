//! Message model for the iAlarm-XR panel protocol.
//!
//! A request or response is a small XML document. Leaf text carries a
//! typed scalar (`STR,5|hello`, `S32,0,0|3`, `TYP,ARM|0`, ...) and the tree
//! itself is addressed by slash paths such as `/Root/Host/GetAlarmStatus`.
//!
//! - [`scalar`] converts between [`Scalar`] values and their leaf text
//! - [`node`] is the ordered field tree shared by requests and responses
//! - [`path`] parses and resolves [`ResponsePath`] addresses
//! - [`xml`] maps trees to documents and back

pub mod error;
pub mod node;
pub mod path;
pub mod scalar;
pub mod xml;

pub use error::{MessageError, Result};
pub use node::{Field, Node};
pub use path::{ResponsePath, Segment};
pub use scalar::{ErrorCode, InvalidMac, MacAddress, Scalar};
pub use xml::{build_document, parse_document, parse_document_bytes};
