//! Workflow domain types for the transaction lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transaction status in the approval workflow.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// Approved and Rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Submitted and awaiting a decision.
    Pending,
    /// Approved; counts toward book aggregates.
    Approved,
    /// Rejected; kept for the record but never aggregated.
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a transaction records money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received into the book.
    Income,
    /// Money spent from the book.
    Expense,
}

impl TransactionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decision an approver takes on a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Accept the transaction into the book's aggregates.
    Approve,
    /// Refuse the transaction.
    Reject,
}

impl Decision {
    /// Returns the status this decision resolves to.
    #[must_use]
    pub const fn resulting_status(&self) -> TransactionStatus {
        match self {
            Self::Approve => TransactionStatus::Approved,
            Self::Reject => TransactionStatus::Rejected,
        }
    }

    /// Parses a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// A validated transition with its audit stamp (who and when).
#[derive(Debug, Clone, Copy)]
pub struct DecisionStamp {
    /// The status the transaction moves to.
    pub new_status: TransactionStatus,
    /// The user who decided.
    pub decided_by: Uuid,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Approved,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("draft"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Approved.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(TransactionKind::parse("INCOME"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse("expense"), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::parse("transfer"), None);
    }

    #[test]
    fn test_decision_resulting_status() {
        assert_eq!(
            Decision::Approve.resulting_status(),
            TransactionStatus::Approved
        );
        assert_eq!(
            Decision::Reject.resulting_status(),
            TransactionStatus::Rejected
        );
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(Decision::parse("approve"), Some(Decision::Approve));
        assert_eq!(Decision::parse("Reject"), Some(Decision::Reject));
        assert_eq!(Decision::parse("void"), None);
    }
}
