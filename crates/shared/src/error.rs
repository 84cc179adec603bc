use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the store returns alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message used when the store answers without a readable body.
    pub fn for_status(status: u16) -> Self {
        Self::new(format!("Erreur {status}"))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no user is stored in the session")]
    MissingUser,
    #[error("stored session user is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
