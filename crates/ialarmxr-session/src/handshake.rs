use std::fmt;

use ialarmxr_message::{Field, Node, Scalar};
use uuid::Uuid;

use crate::config::Credentials;
use crate::error::{Result, SessionError};

/// Client platform advertised in the first leg.
const CLIENT_TYPE: (&str, u32) = ("ANDROID", 0);
/// Login action of the first leg.
const LOGIN_ACTION: (&str, u32) = ("IN", 0);
/// Push-notification field sent verbatim; its declared length is not the
/// text length, and panels expect exactly these bytes.
const PUSH_SLOTS: &str = "STR,5|26";

/// One leg of the pairing handshake, in the order the panel expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    /// Credentials, token and client identity.
    Client,
    /// Peer-to-peer address negotiation.
    P2p,
    /// Camera list query.
    IpcList,
    /// Firmware version query.
    GetVersion,
}

impl Leg {
    pub const ALL: [Leg; 4] = [Leg::Client, Leg::P2p, Leg::IpcList, Leg::GetVersion];

    /// Request root of this leg.
    pub fn path(self) -> &'static str {
        match self {
            Leg::Client => "/Root/Pair/Client",
            Leg::P2p => "/Root/Pair/P2p",
            Leg::IpcList => "/Root/Host/IpcList",
            Leg::GetVersion => "/Root/Host/GetVersion",
        }
    }

    /// Request fields of this leg.
    pub fn request(self, credentials: &Credentials, token: &Uuid) -> Node {
        match self {
            Leg::Client => Node::new()
                .with("Id", Scalar::string(credentials.uid.as_str()))
                .with("Pwd", Scalar::password(credentials.password.as_str()))
                .with("Type", Scalar::type_enum(CLIENT_TYPE.0, CLIENT_TYPE.1))
                .with("Token", Scalar::string(token.to_string()))
                .with("Action", Scalar::type_enum(LOGIN_ACTION.0, LOGIN_ACTION.1))
                .with("PemNum", Scalar::Raw(PUSH_SLOTS.to_string()))
                .with_null("DevVersion")
                .with_null("DevType")
                .with_null("Err"),
            Leg::P2p => Node::new()
                .with_null("Addr")
                .with_null("Flag")
                .with_null("Err"),
            Leg::IpcList => Node::new()
                .with_null("Total")
                .with("Offset", Scalar::int(0))
                .with_null("Ln")
                .with_null("Err"),
            Leg::GetVersion => Node::new()
                .with_null("DevType")
                .with_null("Dev")
                .with_null("Ver")
                .with_null("CodeType")
                .with_null("Err"),
        }
    }

    /// Fail with [`SessionError::Pairing`] if the response carries a non-zero
    /// error code for this leg.
    pub(crate) fn check(self, response: &Node) -> Result<()> {
        match error_code(response, self.path()) {
            Some(code) if code != 0 => Err(SessionError::Pairing { leg: self, code }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Leg::Client => "Pair/Client",
            Leg::P2p => "Pair/P2p",
            Leg::IpcList => "Host/IpcList",
            Leg::GetVersion => "Host/GetVersion",
        };
        f.write_str(name)
    }
}

/// The `Err` code under `root`, if the panel sent one it could decode.
pub(crate) fn error_code(response: &Node, root: &str) -> Option<u8> {
    response
        .select(&format!("{root}/Err"))
        .and_then(Field::as_scalar)
        .and_then(Scalar::error_code)
}
