/// Errors raised while building or parsing message documents.
///
/// An absent field is never an error at this layer; path resolution
/// returns `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The XML reader or writer rejected the document.
    #[error("xml error: {0}")]
    Xml(String),

    /// The document is well-formed XML but not a usable message.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// A value the panel grammar cannot carry.
    #[error("cannot encode {0}")]
    Unencodable(String),

    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, MessageError>;
