//! Error types and error handling utilities
//!
//! This module defines the error taxonomy distinguished by the sync engine.
//! Handlers use this distinction to decide whether to propagate an error
//! (so the queue redelivers) or record it and continue.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type used throughout the sync engine
pub type SyncResult<T> = Result<T, SyncError>;

/// Error taxonomy for the sync engine
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    /// An upstream CRM or downstream telephony request failed. Recorded in
    /// metrics; pagination continues (cursor) or the page-batch is left for
    /// queue redelivery (page-based).
    #[error("transient fetch error: {source_system} - {message}")]
    TransientFetchError { source_system: String, message: String },

    /// A single contact record failed validation (e.g. no phone number).
    /// Recorded per-record; other records in the batch proceed.
    #[error("validation error on record {record_id}: {message}")]
    PerRecordValidationError { record_id: String, message: String },

    /// An `externalId` submitted to `bulkCreateContacts` was not found on
    /// read-back. Accounted as an error; the sync is not aborted.
    #[error("partial read-back: external id {external_id} not found after bulk create")]
    PartialReadBackError { external_id: String },

    /// Webhook recreation failed during `onUpdate`. The whole config update
    /// aborts; the previously persisted config is left unchanged.
    #[error("config update error: {message}")]
    ConfigUpdateError { message: String },

    /// Credential invalid, integration deleted, or another unrecoverable
    /// condition. The owning Process transitions to `FAILED`.
    #[error("fatal integration error for integration {integration_id}: {message}")]
    FatalIntegrationError {
        integration_id: String,
        message: String,
    },

    /// Entity not found in a store (process, mapping, integration config).
    #[error("not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// Illegal state transition attempted on a Process.
    #[error("illegal state transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    /// Serialization/deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Generic internal error not covered by the taxonomy above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn transient_fetch<S1: Into<String>, S2: Into<String>>(source: S1, message: S2) -> Self {
        SyncError::TransientFetchError {
            source_system: source.into(),
            message: message.into(),
        }
    }

    pub fn per_record_validation<S1: Into<String>, S2: Into<String>>(
        record_id: S1,
        message: S2,
    ) -> Self {
        SyncError::PerRecordValidationError {
            record_id: record_id.into(),
            message: message.into(),
        }
    }

    pub fn partial_read_back<S: Into<String>>(external_id: S) -> Self {
        SyncError::PartialReadBackError {
            external_id: external_id.into(),
        }
    }

    pub fn config_update<S: Into<String>>(message: S) -> Self {
        SyncError::ConfigUpdateError {
            message: message.into(),
        }
    }

    pub fn fatal_integration<S1: Into<String>, S2: Into<String>>(
        integration_id: S1,
        message: S2,
    ) -> Self {
        SyncError::FatalIntegrationError {
            integration_id: integration_id.into(),
            message: message.into(),
        }
    }

    pub fn not_found<S1: Into<String>, S2: Into<String>>(entity_type: S1, id: S2) -> Self {
        SyncError::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn illegal_transition<S1: Into<String>, S2: Into<String>>(from: S1, to: S2) -> Self {
        SyncError::IllegalTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        SyncError::Internal(message.into())
    }

    /// Classification used for logging and metrics.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::TransientFetchError { .. } => ErrorCategory::TransientFetch,
            SyncError::PerRecordValidationError { .. } => ErrorCategory::PerRecordValidation,
            SyncError::PartialReadBackError { .. } => ErrorCategory::PartialReadBack,
            SyncError::ConfigUpdateError { .. } => ErrorCategory::ConfigUpdate,
            SyncError::FatalIntegrationError { .. } => ErrorCategory::FatalIntegration,
            SyncError::NotFound { .. } => ErrorCategory::NotFound,
            SyncError::IllegalTransition { .. } => ErrorCategory::IllegalTransition,
            SyncError::Serialization(_) => ErrorCategory::Serialization,
            SyncError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the queue should be allowed to redeliver the message that
    /// produced this error, rather than recording it and moving on.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::TransientFetchError { .. })
    }

    /// Whether this error should transition the owning Process to `FAILED`.
    pub fn is_critical(&self) -> bool {
        matches!(self, SyncError::FatalIntegrationError { .. })
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    TransientFetch,
    PerRecordValidation,
    PartialReadBack,
    ConfigUpdate,
    FatalIntegration,
    NotFound,
    IllegalTransition,
    Serialization,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::TransientFetch => write!(f, "transient_fetch"),
            ErrorCategory::PerRecordValidation => write!(f, "per_record_validation"),
            ErrorCategory::PartialReadBack => write!(f, "partial_read_back"),
            ErrorCategory::ConfigUpdate => write!(f, "config_update"),
            ErrorCategory::FatalIntegration => write!(f, "fatal_integration"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::IllegalTransition => write!(f, "illegal_transition"),
            ErrorCategory::Serialization => write!(f, "serialization"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        SyncError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_are_only_transient_fetch() {
        assert!(SyncError::transient_fetch("crm", "timeout").is_retryable());
        assert!(!SyncError::partial_read_back("abc").is_retryable());
        assert!(!SyncError::config_update("boom").is_retryable());
    }

    #[test]
    fn critical_errors_are_only_fatal_integration() {
        assert!(SyncError::fatal_integration("int-1", "bad credentials").is_critical());
        assert!(!SyncError::transient_fetch("crm", "timeout").is_critical());
    }

    #[test]
    fn category_matches_variant() {
        let err = SyncError::per_record_validation("rec-1", "missing phone");
        assert_eq!(err.category(), ErrorCategory::PerRecordValidation);
    }

    #[test]
    fn error_round_trips_through_json() {
        let err = SyncError::fatal_integration("int-9", "deleted");
        let json = serde_json::to_string(&err).unwrap();
        let back: SyncError = serde_json::from_str(&json).unwrap();
        assert_eq!(err.to_string(), back.to_string());
    }
}
