//! Typed scalar grammar carried in XML leaf text.
//!
//! Wire form is `KIND[,meta...]|value`:
//!
//! | Kind     | Wire text                    |
//! |----------|------------------------------|
//! | String   | `STR,<byte length>|<text>`   |
//! | Password | `PWD,<byte length>|<text>`   |
//! | Type     | `TYP,<name>|<ordinal>`       |
//! | Int32    | `S32,<width>,<flags>|<int>`  |
//! | MAC      | `MAC,<len>|AA:BB:CC:DD:EE:FF`|
//! | Error    | `ERR|<2 digits>`             |
//!
//! Length prefixes are recomputed on encode and ignored on decode, so a
//! panel that reports a wrong length still decodes to the text after `|`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{MessageError, Result};

static ERR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ERR[|,](\d{2})").unwrap());
static MAC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^MAC,(\d+)\|((?:[0-9A-F]{2}[:-]){5}[0-9A-F]{2})").unwrap()
});
static S32_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S32,(\d+),(\d+)\|(-?\d+)").unwrap());
static STR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^STR,(\d+)\|(.*)").unwrap());
static PWD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^PWD,(\d+)\|(.*)").unwrap());
static TYP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^TYP,(\w+)\|(\d+)").unwrap());
static TYP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

/// A leaf value in a panel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Free text.
    Str(String),
    /// Credential text. Only the outer keystream hides it on the wire.
    Password(String),
    /// Enumerated value: a symbolic name plus its ordinal.
    Type { name: String, ordinal: u32 },
    /// Signed integer. `width` and `flags` are panel housekeeping and copied through.
    Int32 { width: u32, flags: u32, value: i32 },
    /// Hardware address.
    Mac(MacAddress),
    /// Status code; [`ErrorCode::OK`] means success.
    Error(ErrorCode),
    /// Leaf text matching no known kind, kept verbatim.
    Raw(String),
}

impl Scalar {
    pub fn string(text: impl Into<String>) -> Self {
        Scalar::Str(text.into())
    }

    pub fn password(text: impl Into<String>) -> Self {
        Scalar::Password(text.into())
    }

    pub fn type_enum(name: impl Into<String>, ordinal: u32) -> Self {
        Scalar::Type {
            name: name.into(),
            ordinal,
        }
    }

    /// An `S32,0,0|value` integer, the form requests use.
    pub fn int(value: i32) -> Self {
        Scalar::Int32 {
            width: 0,
            flags: 0,
            value,
        }
    }

    /// Render the wire text for this value.
    ///
    /// Fails for a [`Scalar::Type`] whose name is not a single word, since
    /// the panel grammar cannot carry it.
    pub fn encode(&self) -> Result<String> {
        if let Scalar::Type { name, .. } = self {
            if !TYP_NAME_RE.is_match(name) {
                return Err(MessageError::Unencodable(format!("type name {name:?}")));
            }
        }
        Ok(self.to_string())
    }

    /// Decode leaf text. Never fails: unknown text becomes [`Scalar::Raw`].
    ///
    /// Patterns are tried in a fixed order: Error, MAC, Int32, String,
    /// Password, Type.
    pub fn decode(text: &str) -> Self {
        decode_error(text)
            .or_else(|| decode_mac(text))
            .or_else(|| decode_int(text))
            .or_else(|| {
                STR_RE
                    .captures(text)
                    .map(|caps| Scalar::Str(caps[2].to_string()))
            })
            .or_else(|| {
                PWD_RE
                    .captures(text)
                    .map(|caps| Scalar::Password(caps[2].to_string()))
            })
            .or_else(|| decode_type(text))
            .unwrap_or_else(|| Scalar::Raw(text.to_string()))
    }

    /// Numeric view: the Int32 value, a Type ordinal, or an Error code.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Scalar::Int32 { value, .. } => Some(*value),
            Scalar::Type { ordinal, .. } => i32::try_from(*ordinal).ok(),
            Scalar::Error(code) => Some(i32::from(code.get())),
            _ => None,
        }
    }

    /// Text view of String, Password and Raw values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(text) | Scalar::Password(text) | Scalar::Raw(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_mac(&self) -> Option<MacAddress> {
        match self {
            Scalar::Mac(mac) => Some(*mac),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<u8> {
        match self {
            Scalar::Error(code) => Some(code.get()),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(text) => write!(f, "STR,{}|{}", text.len(), text),
            Scalar::Password(text) => write!(f, "PWD,{}|{}", text.len(), text),
            Scalar::Type { name, ordinal } => write!(f, "TYP,{name}|{ordinal}"),
            Scalar::Int32 {
                width,
                flags,
                value,
            } => write!(f, "S32,{width},{flags}|{value}"),
            Scalar::Mac(mac) => {
                let text = mac.to_string();
                write!(f, "MAC,{}|{}", text.len(), text)
            }
            Scalar::Error(code) => write!(f, "ERR|{code}"),
            Scalar::Raw(text) => f.write_str(text),
        }
    }
}

fn decode_error(text: &str) -> Option<Scalar> {
    let caps = ERR_RE.captures(text)?;
    caps[1].parse().ok().and_then(ErrorCode::new).map(Scalar::Error)
}

fn decode_mac(text: &str) -> Option<Scalar> {
    let caps = MAC_RE.captures(text)?;
    caps[2].parse().ok().map(Scalar::Mac)
}

fn decode_int(text: &str) -> Option<Scalar> {
    let caps = S32_RE.captures(text)?;
    Some(Scalar::Int32 {
        width: caps[1].parse().ok()?,
        flags: caps[2].parse().ok()?,
        value: caps[3].parse().ok()?,
    })
}

fn decode_type(text: &str) -> Option<Scalar> {
    let caps = TYP_RE.captures(text)?;
    Some(Scalar::Type {
        name: caps[1].to_string(),
        ordinal: caps[2].parse().ok()?,
    })
}

/// A panel status code. The wire carries exactly two digits, so codes
/// stop at 99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(u8);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0);
    pub const MAX: u8 = 99;

    pub const fn new(code: u8) -> Option<Self> {
        if code <= Self::MAX {
            Some(ErrorCode(code))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for ErrorCode {
    type Error = MessageError;

    fn try_from(code: u8) -> Result<Self> {
        ErrorCode::new(code)
            .ok_or_else(|| MessageError::Unencodable(format!("error code {code} exceeds two digits")))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A 48-bit hardware address, shown as uppercase colon-separated hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Error returned when text is not six hex pairs separated by `:` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address: {0}")]
pub struct InvalidMac(pub String);

impl FromStr for MacAddress {
    type Err = InvalidMac;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || InvalidMac(s.to_string());
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        Ok(MacAddress(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
