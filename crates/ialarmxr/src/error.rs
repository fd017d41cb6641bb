use ialarmxr_session::SessionError;

/// Errors returned by [`crate::AlarmPanel`] operations.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Connection, pairing or protocol failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The panel answered without a field the operation needs.
    #[error("panel reply is missing {0}")]
    MissingField(String),

    /// A field was present but could not be interpreted.
    #[error("unexpected value for {field}: {value}")]
    UnexpectedValue { field: String, value: String },
}

impl PanelError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PanelError::Session(err) if err.is_timeout())
    }

    pub(crate) fn unexpected(field: &str, value: impl ToString) -> Self {
        PanelError::UnexpectedValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
