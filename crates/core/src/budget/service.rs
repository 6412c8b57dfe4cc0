//! Budget aggregation logic.

use crate::budget::types::BookSummary;
use crate::workflow::types::{TransactionKind, TransactionStatus};

/// Stateless service deriving book totals.
pub struct BudgetService;

impl BudgetService {
    /// Summarizes a book's transactions against its optional budget.
    ///
    /// `budget` is the book's budget in minor units; `None` or a
    /// non-positive value disables percent calculation. Each item is a
    /// `(kind, status, amount)` triple; only approved items are counted.
    /// Totals saturate at `i64::MAX` rather than wrapping.
    #[must_use]
    pub fn summarize<I>(budget: Option<i64>, items: I) -> BookSummary
    where
        I: IntoIterator<Item = (TransactionKind, TransactionStatus, i64)>,
    {
        let mut total_income: i64 = 0;
        let mut total_expenses: i64 = 0;

        for (kind, status, amount) in items {
            if status != TransactionStatus::Approved {
                continue;
            }
            match kind {
                TransactionKind::Income => total_income = total_income.saturating_add(amount),
                TransactionKind::Expense => total_expenses = total_expenses.saturating_add(amount),
            }
        }

        let raw_spent_percent = match budget {
            Some(b) if b > 0 => percent_of(total_expenses, b),
            _ => 0,
        };
        let spent_percent = u8::try_from(raw_spent_percent.clamp(0, 100)).unwrap_or(100);

        BookSummary {
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
            spent_percent,
            raw_spent_percent,
            over_budget: raw_spent_percent > 100,
        }
    }
}

/// Integer percentage with half-up rounding, widened through i128 so the
/// multiplication cannot overflow.
fn percent_of(part: i64, whole: i64) -> i64 {
    let scaled = i128::from(part) * 100 + i128::from(whole) / 2;
    i64::try_from(scaled / i128::from(whole)).unwrap_or(i64::MAX)
}
