//! Workflow error types.

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::TransactionStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A decision was attempted on a transaction that is no longer pending.
    ///
    /// Carries the actual current status so the caller can refresh its view.
    #[error("transaction has already been decided (current status: {current})")]
    AlreadyDecided {
        /// The transaction's actual current status.
        current: TransactionStatus,
    },

    /// Transaction not found.
    #[error("transaction {0} not found")]
    TransactionNotFound(Uuid),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyDecided { .. } => 409,
            Self::TransactionNotFound(_) => 404,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyDecided { .. } => "already_decided",
            Self::TransactionNotFound(_) => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_decided_error() {
        let err = WorkflowError::AlreadyDecided {
            current: TransactionStatus::Approved,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "already_decided");
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_not_found_error() {
        let err = WorkflowError::TransactionNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "not_found");
    }
}
