//! Policy denial errors.

use thiserror::Error;

use crate::policy::types::BookRole;

/// Errors returned when an action is denied.
///
/// Denials split into two families: authorization failures (the actor
/// lacks the role) and state failures (the book would be left in an
/// invalid state, e.g. without any approval-capable member). Callers
/// surface these verbatim and never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The actor has no membership in the book.
    #[error("you are not a member of this book")]
    NotMember,

    /// The actor's role does not permit the action.
    #[error("{action} requires {required} role")]
    Denied {
        /// The action that was attempted.
        action: &'static str,
        /// The minimum role required for the action.
        required: &'static str,
    },

    /// A membership action was aimed at the actor themself.
    #[error("cannot {action} on yourself")]
    SelfTarget {
        /// The action that was attempted.
        action: &'static str,
    },

    /// The target member's role does not fit the action.
    #[error("cannot {action}: target has role {target_role}")]
    InvalidTargetRole {
        /// The action that was attempted.
        action: &'static str,
        /// The target member's actual role.
        target_role: BookRole,
    },

    /// The target is the last approval-capable member of the book.
    #[error("cannot remove or demote the last member able to approve transactions")]
    LastApprover,

    /// The creator attempted to leave their own book.
    #[error("the creator cannot leave the book; delete it instead")]
    CreatorCannotLeave,
}

impl PolicyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotMember | Self::Denied { .. } => 403,
            Self::SelfTarget { .. } | Self::InvalidTargetRole { .. } => 400,
            Self::LastApprover | Self::CreatorCannotLeave => 409,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotMember => "not_member",
            Self::Denied { .. } => "forbidden",
            Self::SelfTarget { .. } => "self_target",
            Self::InvalidTargetRole { .. } => "invalid_target",
            Self::LastApprover => "last_approver",
            Self::CreatorCannotLeave => "creator_cannot_leave",
        }
    }
}
