//! Budget aggregate types.

use serde::{Deserialize, Serialize};

/// Derived totals for a book, computed from approved transactions only.
///
/// All amounts are integer minor units in the book's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    /// Sum of approved income amounts.
    pub total_income: i64,
    /// Sum of approved expense amounts.
    pub total_expenses: i64,
    /// `total_income - total_expenses`; may be negative.
    pub net_balance: i64,
    /// Percentage of budget spent, clamped to [0, 100] for display.
    pub spent_percent: u8,
    /// Unclamped percentage of budget spent; exceeds 100 when over budget.
    pub raw_spent_percent: i64,
    /// True when approved expenses exceed the budget.
    pub over_budget: bool,
}

impl BookSummary {
    /// An empty summary: no approved transactions, no budget.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_income: 0,
            total_expenses: 0,
            net_balance: 0,
            spent_percent: 0,
            raw_spent_percent: 0,
            over_budget: false,
        }
    }
}
