// Error types for the rental core
//
// Every failure is local and recoverable: an operation that returns an error
// has not changed any store.

use std::path::PathBuf;

use thiserror::Error;

use crate::ledger::LoanId;

#[derive(Debug, Error)]
pub enum RentalError {
    /// A required field was missing or blank
    #[error("kind=validation: {field}: {message}")]
    Validation { field: String, message: String },

    /// The referenced loan does not exist in this session
    #[error("kind=not_found: loan #{loan_id} does not exist")]
    NotFound { loan_id: LoanId },

    /// The loan is not in a state that allows the operation
    #[error("kind=invalid_state: loan #{loan_id}: {message}")]
    InvalidState { loan_id: LoanId, message: String },

    /// Reading a roster file failed before any parsing happened
    #[error("kind=io: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RentalError {
    pub fn kind(&self) -> &'static str {
        match self {
            RentalError::Validation { .. } => "validation",
            RentalError::NotFound { .. } => "not_found",
            RentalError::InvalidState { .. } => "invalid_state",
            RentalError::Io { .. } => "io",
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RentalError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Blank-field rejection used by every mutating operation
    pub fn required(field: &str) -> Self {
        RentalError::validation(field, "Required field is empty")
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RentalError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RentalError>;

/// Returns the trimmed value, or a validation error naming `field` when blank.
pub(crate) fn require_non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RentalError::required(field))
    } else {
        Ok(trimmed)
    }
}
