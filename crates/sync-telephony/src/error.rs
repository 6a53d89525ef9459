//! Error type for the downstream telephony platform's HTTP surface.

use sync_core::errors::SyncError;
use thiserror::Error;

/// Errors raised by the reqwest-backed [`crate::client::QuoClient`]. Always
/// mapped to a [`SyncError`] at the call site so the rest of the engine
/// never has to know this crate exists.
#[derive(Debug, Error)]
pub enum QuoApiError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("response decode error: {0}")]
    Decode(String),

    #[error("{field} exceeds the platform limit of {limit} (got {actual})")]
    LimitExceeded {
        field: &'static str,
        limit: usize,
        actual: usize,
    },
}

impl From<QuoApiError> for SyncError {
    fn from(err: QuoApiError) -> Self {
        match &err {
            QuoApiError::Transport(_) | QuoApiError::Http { .. } => {
                SyncError::transient_fetch("telephony", err.to_string())
            }
            QuoApiError::Decode(_) | QuoApiError::LimitExceeded { .. } => {
                SyncError::internal(err.to_string())
            }
        }
    }
}
