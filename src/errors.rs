use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while logging a meal.
///
/// `MalformedNutritionResponse` and `CollaboratorUnavailable` are raised before
/// anything is written. `ArchivalFailure` is only ever reported, never fatal.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("could not read nutrition values for '{description}': {reason} (reply was {reply:?})")]
    MalformedNutritionResponse {
        description: String,
        reply: String,
        reason: String,
    },

    #[error("nutrition model at {endpoint} is unavailable: {reason}")]
    CollaboratorUnavailable { endpoint: String, reason: String },

    #[error("ledger file {} is corrupt: {reason}", .path.display())]
    CorruptLedgerFile { path: PathBuf, reason: String },

    #[error("could not save ledger to {}: {source}", .path.display())]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("git {step} failed: {reason}")]
    ArchivalFailure { step: String, reason: String },

    #[error("{field} cannot be empty")]
    EmptyInput { field: &'static str },

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

impl TrackerError {
    /// True for model failures, which happen before anything is written and
    /// may well succeed on a second try.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TrackerError::CollaboratorUnavailable { .. }
                | TrackerError::MalformedNutritionResponse { .. }
        )
    }
}
