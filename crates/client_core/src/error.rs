use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("unknown bill status: {0:?}")]
    UnknownStatus(String),
}

/// Failure reported by a [`crate::store::BillStore`].
///
/// `Status` and `Rejected` display the store's message verbatim so the
/// error page can show it as is.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid store response: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
