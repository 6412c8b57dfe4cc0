//! Policy domain types: roles, actions, and target context.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A member's role within a book.
///
/// Roles are ordered from lowest to highest privilege. There is exactly
/// one creator per book, assigned at creation and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookRole {
    /// Can submit transactions and view the book.
    Member = 0,
    /// Can additionally approve, reject, and manage membership.
    Admin = 1,
    /// The book's owner; full control, cannot leave or be removed.
    Creator = 2,
}

impl BookRole {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "creator" => Some(Self::Creator),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Creator => "creator",
        }
    }

    /// Returns true if this role can approve or reject transactions.
    #[must_use]
    pub const fn is_approval_capable(&self) -> bool {
        matches!(self, Self::Admin | Self::Creator)
    }
}

impl fmt::Display for BookRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Context about the member an action is aimed at.
///
/// Membership actions (promote, demote, remove) need to know who the
/// target is relative to the actor and to the book's invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberTarget {
    /// The target member's current role.
    pub role: BookRole,
    /// True if the target is the actor themself.
    pub is_self: bool,
    /// True if the target is the only remaining approval-capable member.
    pub is_last_approver: bool,
}

/// An action a member can request against a book.
///
/// Membership actions carry their [`MemberTarget`] so the decision
/// function stays pure: all contextual facts arrive with the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAction {
    /// Submit a new transaction into the book's ledger.
    SubmitTransaction,
    /// Approve or reject a pending transaction.
    DecideTransaction,
    /// Hard-delete a transaction, regardless of its status.
    DeleteTransaction {
        /// True if the actor is the transaction's original submitter.
        own_submission: bool,
    },
    /// Edit the book's name, description, or budget.
    EditBook,
    /// Delete the book and everything it owns.
    DeleteBook,
    /// Invalidate the current invitation code and issue a new one.
    RegenerateInvitation,
    /// Promote a member to admin.
    PromoteMember {
        /// The member being promoted.
        target: MemberTarget,
    },
    /// Demote an admin back to member.
    DemoteAdmin {
        /// The admin being demoted.
        target: MemberTarget,
    },
    /// Remove a member from the book.
    RemoveMember {
        /// The member being removed.
        target: MemberTarget,
    },
    /// Leave the book voluntarily.
    LeaveBook,
}

impl BookAction {
    /// Returns a short name for the action, used in denial messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitTransaction => "submit transaction",
            Self::DecideTransaction => "decide transaction",
            Self::DeleteTransaction { .. } => "delete transaction",
            Self::EditBook => "edit book",
            Self::DeleteBook => "delete book",
            Self::RegenerateInvitation => "regenerate invitation code",
            Self::PromoteMember { .. } => "promote member",
            Self::DemoteAdmin { .. } => "demote admin",
            Self::RemoveMember { .. } => "remove member",
            Self::LeaveBook => "leave book",
        }
    }
}
