//! Property-based tests for budget aggregation.

use proptest::prelude::*;

use crate::budget::service::BudgetService;
use crate::workflow::types::{TransactionKind, TransactionStatus};

fn arb_item() -> impl Strategy<Value = (TransactionKind, TransactionStatus, i64)> {
    (
        prop_oneof![Just(TransactionKind::Income), Just(TransactionKind::Expense)],
        prop_oneof![
            Just(TransactionStatus::Pending),
            Just(TransactionStatus::Approved),
            Just(TransactionStatus::Rejected),
        ],
        1i64..10_000_000i64,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The balance identity holds exactly for any transaction set: no
    /// rounding drift with integer minor units.
    #[test]
    fn prop_net_balance_identity(items in prop::collection::vec(arb_item(), 0..50)) {
        let summary = BudgetService::summarize(None, items);
        prop_assert_eq!(
            summary.net_balance,
            summary.total_income - summary.total_expenses
        );
    }

    /// Non-approved transactions contribute to no aggregate.
    #[test]
    fn prop_only_approved_counted(items in prop::collection::vec(arb_item(), 0..50)) {
        let approved_only: Vec<_> = items
            .iter()
            .copied()
            .filter(|(_, status, _)| *status == TransactionStatus::Approved)
            .collect();

        let full = BudgetService::summarize(Some(1_000_000), items);
        let filtered = BudgetService::summarize(Some(1_000_000), approved_only);

        prop_assert_eq!(full, filtered);
    }

    /// The clamped percent never leaves [0, 100], and the over-budget flag
    /// agrees with the raw percent.
    #[test]
    fn prop_percent_clamped_and_flag_consistent(
        budget in 1i64..100_000_000i64,
        items in prop::collection::vec(arb_item(), 0..50),
    ) {
        let summary = BudgetService::summarize(Some(budget), items);

        prop_assert!(summary.spent_percent <= 100);
        prop_assert_eq!(summary.over_budget, summary.raw_spent_percent > 100);
        prop_assert!(summary.raw_spent_percent >= 0);
    }
}
