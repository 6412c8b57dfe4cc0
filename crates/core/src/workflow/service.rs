//! State transition logic for the approval workflow.

use chrono::Utc;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Decision, DecisionStamp, TransactionStatus};

/// Stateless service validating workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Decides a pending transaction.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyDecided`] if the transaction is not
    /// in `Pending` status; the error carries the actual current status.
    pub fn decide(
        current_status: TransactionStatus,
        decided_by: Uuid,
        decision: Decision,
    ) -> Result<DecisionStamp, WorkflowError> {
        match current_status {
            TransactionStatus::Pending => Ok(DecisionStamp {
                new_status: decision.resulting_status(),
                decided_by,
                decided_at: Utc::now(),
            }),
            _ => Err(WorkflowError::AlreadyDecided {
                current: current_status,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    #[must_use]
    pub fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            (
                TransactionStatus::Pending,
                TransactionStatus::Approved | TransactionStatus::Rejected
            )
        )
    }
}
