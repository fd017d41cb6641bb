//! Session layer for iAlarm-XR panels.
//!
//! A [`Session`] owns one TCP connection at a time. Every fresh connection
//! runs the four-leg pairing handshake (Client, P2p, IpcList, GetVersion)
//! before any command is serviced; after that the session answers
//! [`Session::request`] and [`Session::request_list`] calls. Any error
//! closes the socket so the next call starts over from a clean connect.

pub mod config;
pub mod error;
pub mod handshake;
pub mod pagination;
pub mod session;

pub use config::{
    Credentials, SessionConfig, DEFAULT_HOST, DEFAULT_MAX_PAGES, DEFAULT_PORT, DEFAULT_TIMEOUT,
};
pub use error::{Result, SessionError};
pub use handshake::Leg;
pub use pagination::{collect_pages, Page};
pub use session::Session;

pub use ialarmxr_message::{Field, MacAddress, Node, ResponsePath, Scalar};
