//! Property-based tests for the policy engine.

use proptest::prelude::*;

use crate::policy::error::PolicyError;
use crate::policy::service::PolicyEngine;
use crate::policy::types::{BookAction, BookRole, MemberTarget};

/// Strategy for generating random roles.
fn arb_role() -> impl Strategy<Value = BookRole> {
    prop_oneof![
        Just(BookRole::Member),
        Just(BookRole::Admin),
        Just(BookRole::Creator),
    ]
}

/// Strategy for generating random member targets.
fn arb_target() -> impl Strategy<Value = MemberTarget> {
    (arb_role(), any::<bool>(), any::<bool>()).prop_map(|(role, is_self, is_last_approver)| {
        MemberTarget {
            role,
            is_self,
            is_last_approver,
        }
    })
}

/// Strategy for generating random actions.
fn arb_action() -> impl Strategy<Value = BookAction> {
    prop_oneof![
        Just(BookAction::SubmitTransaction),
        Just(BookAction::DecideTransaction),
        any::<bool>().prop_map(|own_submission| BookAction::DeleteTransaction { own_submission }),
        Just(BookAction::EditBook),
        Just(BookAction::DeleteBook),
        Just(BookAction::RegenerateInvitation),
        arb_target().prop_map(|target| BookAction::PromoteMember { target }),
        arb_target().prop_map(|target| BookAction::DemoteAdmin { target }),
        arb_target().prop_map(|target| BookAction::RemoveMember { target }),
        Just(BookAction::LeaveBook),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Non-members are denied every action with the same error.
    #[test]
    fn prop_non_member_always_denied(action in arb_action()) {
        prop_assert_eq!(
            PolicyEngine::authorize(None, &action),
            Err(PolicyError::NotMember)
        );
    }

    /// A plain member can never decide a transaction, whatever the book looks like.
    #[test]
    fn prop_member_never_decides(_seed in any::<u8>()) {
        let result = PolicyEngine::authorize(Some(BookRole::Member), &BookAction::DecideTransaction);
        let denied = matches!(result, Err(PolicyError::Denied { .. }));
        prop_assert!(denied);
    }

    /// Removing or demoting the last approval-capable member is always a
    /// state error, no matter who asks.
    #[test]
    fn prop_last_approver_always_protected(actor in arb_role(), role in arb_role()) {
        let target = MemberTarget { role, is_self: false, is_last_approver: true };

        for action in [
            BookAction::RemoveMember { target },
            BookAction::DemoteAdmin { target },
        ] {
            let result = PolicyEngine::authorize(Some(actor), &action);
            // Other checks may fire first (role, target role), but the
            // action must never be allowed.
            prop_assert!(result.is_err());
        }
    }

    /// Whatever the actor's role, a creator target can never be removed.
    #[test]
    fn prop_creator_never_removable(actor in arb_role(), last in any::<bool>()) {
        let action = BookAction::RemoveMember {
            target: MemberTarget {
                role: BookRole::Creator,
                is_self: false,
                is_last_approver: last,
            },
        };
        prop_assert!(PolicyEngine::authorize(Some(actor), &action).is_err());
    }

    /// Authorization is monotone in role: anything a member may do, an
    /// admin may do, and so on up to the creator. Leaving is excluded
    /// because it is the creator's one restriction.
    #[test]
    fn prop_privilege_is_monotone(action in arb_action()) {
        if matches!(action, BookAction::LeaveBook) {
            return Ok(());
        }
        // Promotion/demotion are deliberately creator-only, so monotonicity
        // only holds upward from admin for those.
        let ladder: &[BookRole] = if matches!(
            action,
            BookAction::PromoteMember { .. } | BookAction::DemoteAdmin { .. }
        ) {
            &[BookRole::Admin, BookRole::Creator]
        } else {
            &[BookRole::Member, BookRole::Admin, BookRole::Creator]
        };

        let mut previously_allowed = false;
        for role in ladder {
            let allowed = PolicyEngine::authorize(Some(*role), &action).is_ok();
            if previously_allowed {
                // Target-context denials (self, wrong target role, last
                // approver) hit every role equally; only pure role denials
                // must be monotone.
                let target_denial = matches!(
                    PolicyEngine::authorize(Some(*role), &action),
                    Err(PolicyError::SelfTarget { .. }
                        | PolicyError::InvalidTargetRole { .. }
                        | PolicyError::LastApprover)
                );
                prop_assert!(allowed || target_denial);
            }
            previously_allowed = previously_allowed || allowed;
        }
    }
}
