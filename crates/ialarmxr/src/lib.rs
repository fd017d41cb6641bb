//! Client for iAlarm-XR security panels.
//!
//! [`AlarmPanel`] exposes the panel's domain operations. Each call opens a
//! connection, pairs, runs its commands and closes again.
//!
//! ```no_run
//! use ialarmxr::{AlarmPanel, AlarmStatus, Credentials, SessionConfig};
//!
//! let mut panel = AlarmPanel::new(
//!     Credentials::new("my-panel-id", "my-password"),
//!     SessionConfig::default(),
//! );
//! if panel.get_status()? == AlarmStatus::Triggered {
//!     panel.cancel_alarm()?;
//! }
//! # Ok::<(), ialarmxr::PanelError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connection to a panel or the vendor relay
//! - [`frame`]: `@ieM` framing and the payload keystream
//! - [`message`]: typed scalars and the XML field tree
//! - [`session`]: pairing handshake, request exchange and pagination

mod error;
mod panel;
mod status;

pub use error::{PanelError, Result};
pub use panel::{AlarmPanel, PanelVersion};
pub use status::{AlarmStatus, ZoneStatus};

pub use ialarmxr_message::MacAddress;
pub use ialarmxr_session::{Credentials, SessionConfig};

/// Re-export transport types.
pub mod transport {
    pub use ialarmxr_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ialarmxr_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use ialarmxr_message::*;
}

/// Re-export session types.
pub mod session {
    pub use ialarmxr_session::*;
}
