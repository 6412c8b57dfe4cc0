//! The policy decision function.
//!
//! A single table of rules, expressed as one match. Repositories call
//! this before mutating anything; the membership repository additionally
//! re-verifies the creator and last-approver invariants inside its
//! database transaction so they hold under concurrent requests.

use crate::policy::error::PolicyError;
use crate::policy::types::{BookAction, BookRole, MemberTarget};

/// Stateless engine for authorization decisions.
pub struct PolicyEngine;

impl PolicyEngine {
    /// Decides whether an actor may perform an action on a book.
    ///
    /// `actor` is the actor's role in the book, or `None` when the actor
    /// has no membership. All contextual facts about the target travel
    /// inside the [`BookAction`] variant.
    ///
    /// # Errors
    ///
    /// Returns the matching [`PolicyError`] when the action is denied.
    pub fn authorize(actor: Option<BookRole>, action: &BookAction) -> Result<(), PolicyError> {
        let role = actor.ok_or(PolicyError::NotMember)?;

        match *action {
            BookAction::SubmitTransaction => Ok(()),

            BookAction::DecideTransaction | BookAction::RegenerateInvitation => {
                Self::require_approval_capable(role, action)
            }

            BookAction::DeleteTransaction { own_submission } => {
                if own_submission {
                    Ok(())
                } else {
                    Self::require_approval_capable(role, action)
                }
            }

            BookAction::EditBook => Self::require_approval_capable(role, action),

            BookAction::DeleteBook => Self::require_creator(role, action),

            BookAction::PromoteMember { target } => {
                Self::require_creator(role, action)?;
                Self::require_other(target, action)?;
                if target.role == BookRole::Member {
                    Ok(())
                } else {
                    Err(PolicyError::InvalidTargetRole {
                        action: action.name(),
                        target_role: target.role,
                    })
                }
            }

            BookAction::DemoteAdmin { target } => {
                Self::require_creator(role, action)?;
                Self::require_other(target, action)?;
                if target.role != BookRole::Admin {
                    return Err(PolicyError::InvalidTargetRole {
                        action: action.name(),
                        target_role: target.role,
                    });
                }
                if target.is_last_approver {
                    return Err(PolicyError::LastApprover);
                }
                Ok(())
            }

            BookAction::RemoveMember { target } => {
                Self::require_approval_capable(role, action)?;
                Self::require_other(target, action)?;
                if target.role == BookRole::Creator {
                    return Err(PolicyError::InvalidTargetRole {
                        action: action.name(),
                        target_role: target.role,
                    });
                }
                if target.is_last_approver {
                    return Err(PolicyError::LastApprover);
                }
                Ok(())
            }

            BookAction::LeaveBook => {
                if role == BookRole::Creator {
                    Err(PolicyError::CreatorCannotLeave)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn require_approval_capable(role: BookRole, action: &BookAction) -> Result<(), PolicyError> {
        if role.is_approval_capable() {
            Ok(())
        } else {
            Err(PolicyError::Denied {
                action: action.name(),
                required: BookRole::Admin.as_str(),
            })
        }
    }

    fn require_creator(role: BookRole, action: &BookAction) -> Result<(), PolicyError> {
        if role == BookRole::Creator {
            Ok(())
        } else {
            Err(PolicyError::Denied {
                action: action.name(),
                required: BookRole::Creator.as_str(),
            })
        }
    }

    fn require_other(target: MemberTarget, action: &BookAction) -> Result<(), PolicyError> {
        if target.is_self {
            Err(PolicyError::SelfTarget {
                action: action.name(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(role: BookRole) -> MemberTarget {
        MemberTarget {
            role,
            is_self: false,
            is_last_approver: false,
        }
    }

    #[test]
    fn test_non_member_denied_everything() {
        for action in [
            BookAction::SubmitTransaction,
            BookAction::DecideTransaction,
            BookAction::EditBook,
            BookAction::LeaveBook,
        ] {
            assert_eq!(
                PolicyEngine::authorize(None, &action),
                Err(PolicyError::NotMember)
            );
        }
    }

    #[test]
    fn test_any_member_can_submit() {
        for role in [BookRole::Member, BookRole::Admin, BookRole::Creator] {
            assert!(
                PolicyEngine::authorize(Some(role), &BookAction::SubmitTransaction).is_ok()
            );
        }
    }

    #[test]
    fn test_member_cannot_decide() {
        let result =
            PolicyEngine::authorize(Some(BookRole::Member), &BookAction::DecideTransaction);
        assert_eq!(
            result,
            Err(PolicyError::Denied {
                action: "decide transaction",
                required: "admin",
            })
        );
    }

    #[test]
    fn test_admin_and_creator_can_decide() {
        for role in [BookRole::Admin, BookRole::Creator] {
            assert!(
                PolicyEngine::authorize(Some(role), &BookAction::DecideTransaction).is_ok()
            );
        }
    }

    #[test]
    fn test_submitter_can_delete_own_transaction() {
        let action = BookAction::DeleteTransaction {
            own_submission: true,
        };
        assert!(PolicyEngine::authorize(Some(BookRole::Member), &action).is_ok());
    }

    #[test]
    fn test_member_cannot_delete_others_transaction() {
        let action = BookAction::DeleteTransaction {
            own_submission: false,
        };
        assert!(PolicyEngine::authorize(Some(BookRole::Member), &action).is_err());
        assert!(PolicyEngine::authorize(Some(BookRole::Admin), &action).is_ok());
    }

    #[test]
    fn test_only_creator_deletes_book() {
        assert!(PolicyEngine::authorize(Some(BookRole::Admin), &BookAction::DeleteBook).is_err());
        assert!(PolicyEngine::authorize(Some(BookRole::Creator), &BookAction::DeleteBook).is_ok());
    }

    #[test]
    fn test_admin_can_edit_and_regenerate() {
        assert!(PolicyEngine::authorize(Some(BookRole::Admin), &BookAction::EditBook).is_ok());
        assert!(
            PolicyEngine::authorize(Some(BookRole::Admin), &BookAction::RegenerateInvitation)
                .is_ok()
        );
        assert!(PolicyEngine::authorize(Some(BookRole::Member), &BookAction::EditBook).is_err());
    }

    #[test]
    fn test_promote_is_creator_only() {
        let action = BookAction::PromoteMember {
            target: target(BookRole::Member),
        };
        assert!(PolicyEngine::authorize(Some(BookRole::Admin), &action).is_err());
        assert!(PolicyEngine::authorize(Some(BookRole::Creator), &action).is_ok());
    }

    #[test]
    fn test_promote_requires_member_target() {
        let action = BookAction::PromoteMember {
            target: target(BookRole::Admin),
        };
        assert!(matches!(
            PolicyEngine::authorize(Some(BookRole::Creator), &action),
            Err(PolicyError::InvalidTargetRole { .. })
        ));
    }

    #[test]
    fn test_demote_requires_admin_target() {
        let action = BookAction::DemoteAdmin {
            target: target(BookRole::Member),
        };
        assert!(matches!(
            PolicyEngine::authorize(Some(BookRole::Creator), &action),
            Err(PolicyError::InvalidTargetRole { .. })
        ));
    }

    #[test]
    fn test_self_target_rejected() {
        let action = BookAction::RemoveMember {
            target: MemberTarget {
                role: BookRole::Member,
                is_self: true,
                is_last_approver: false,
            },
        };
        assert!(matches!(
            PolicyEngine::authorize(Some(BookRole::Creator), &action),
            Err(PolicyError::SelfTarget { .. })
        ));
    }

    #[test]
    fn test_creator_cannot_be_removed() {
        let action = BookAction::RemoveMember {
            target: target(BookRole::Creator),
        };
        assert!(matches!(
            PolicyEngine::authorize(Some(BookRole::Admin), &action),
            Err(PolicyError::InvalidTargetRole { .. })
        ));
    }

    #[test]
    fn test_last_approver_protected() {
        let last = MemberTarget {
            role: BookRole::Admin,
            is_self: false,
            is_last_approver: true,
        };
        assert_eq!(
            PolicyEngine::authorize(
                Some(BookRole::Creator),
                &BookAction::RemoveMember { target: last }
            ),
            Err(PolicyError::LastApprover)
        );
        assert_eq!(
            PolicyEngine::authorize(
                Some(BookRole::Creator),
                &BookAction::DemoteAdmin { target: last }
            ),
            Err(PolicyError::LastApprover)
        );
    }

    #[test]
    fn test_creator_cannot_leave() {
        assert_eq!(
            PolicyEngine::authorize(Some(BookRole::Creator), &BookAction::LeaveBook),
            Err(PolicyError::CreatorCannotLeave)
        );
        assert!(PolicyEngine::authorize(Some(BookRole::Admin), &BookAction::LeaveBook).is_ok());
        assert!(PolicyEngine::authorize(Some(BookRole::Member), &BookAction::LeaveBook).is_ok());
    }
}
