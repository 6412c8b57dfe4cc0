//! Property-based tests for the workflow state machine.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{Decision, TransactionStatus};

fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Approved),
        Just(TransactionStatus::Rejected),
    ]
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Once terminal, always terminal: any decision against a decided
    /// transaction fails and reports the unchanged current status.
    #[test]
    fn prop_terminal_states_are_final(
        status in arb_status(),
        decision in arb_decision(),
    ) {
        let result = WorkflowService::decide(status, Uuid::new_v4(), decision);

        if status.is_terminal() {
            prop_assert_eq!(
                result.unwrap_err(),
                WorkflowError::AlreadyDecided { current: status }
            );
        } else {
            let stamp = result.unwrap();
            prop_assert_eq!(stamp.new_status, decision.resulting_status());
            prop_assert!(stamp.new_status.is_terminal());
        }
    }

    /// Every transition the service performs is one the transition table
    /// also considers valid.
    #[test]
    fn prop_decide_agrees_with_transition_table(
        status in arb_status(),
        decision in arb_decision(),
    ) {
        if let Ok(stamp) = WorkflowService::decide(status, Uuid::new_v4(), decision) {
            prop_assert!(WorkflowService::is_valid_transition(status, stamp.new_status));
        }
    }
}
