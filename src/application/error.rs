use thiserror::Error;

use crate::domain::{LedgerError, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Group already exists: {0}")]
    GroupAlreadyExists(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failed; the in-memory group was rolled back to match it.
    #[error("Persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Ledger(LedgerError::Validation(err))
    }
}
