//! Blocking TCP transport for iAlarm-XR panels.
//!
//! This is the lowest layer of ialarmxr. A panel (or the vendor relay that
//! fronts it) is reached over a plain TCP socket; everything else builds on
//! top of the [`PanelStream`] type provided here.

pub mod error;
pub mod stream;

pub use error::{Result, TransportError};
pub use stream::{connect, PanelStream};
