// glacier-restore/src/errors.rs
use std::time::Duration;
use thiserror::Error;

use crate::storage::types::StorageTier;

/// Failure of a single call against the remote object store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network, credential, throttling or dispatch failure with no service error code.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed service response carrying a machine-readable error code.
    #[error("{}", format_code_message(.code, .message))]
    Api { code: String, message: String },
}

impl StoreError {
    /// Service error code, if the remote side returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Api { code, .. } => Some(code),
            StoreError::Transport(_) => None,
        }
    }
}

/// "fastest" mode has no retrieval tier for the object's current storage class.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown storage class {tier}: unmappable tier")]
pub struct ResolutionError {
    pub tier: StorageTier,
}

/// Per-key failure recorded by the restore submitter. Never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The task running the submission died before producing a result.
    #[error("restore task aborted: {0}")]
    Aborted(String),

    /// The call went through but the response reports a failure.
    #[error("status {status}: {}", format_code_message(.code, .message))]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}

impl RestoreError {
    /// Remote error code carried by this failure, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            RestoreError::Store(err) => err.code(),
            RestoreError::Rejected { code, .. } => Some(code),
            RestoreError::Resolution(_) | RestoreError::Timeout(_) | RestoreError::Aborted(_) => {
                None
            }
        }
    }
}

fn format_code_message(code: &str, message: &str) -> String {
    if message.is_empty() {
        code.to_string()
    } else {
        format!("{}: {}", code, message)
    }
}
