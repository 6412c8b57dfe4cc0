//! Budget aggregation over a book's transactions.
//!
//! Totals are derived on demand from the approved transaction set; nothing
//! is cached or stored. Pending and rejected transactions never contribute.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::BudgetService;
pub use types::BookSummary;
