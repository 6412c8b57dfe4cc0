//! Database-backed enums, stored as short strings for portability.
//!
//! Each enum converts to and from its `hearth-core` counterpart; the core
//! types carry the behavior, these only carry the storage mapping.

use hearth_core::policy::BookRole;
use hearth_core::workflow::{TransactionKind as CoreKind, TransactionStatus as CoreStatus};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Role of a user within a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Book creator, exactly one per book.
    #[sea_orm(string_value = "creator")]
    Creator,
    /// Approval-capable co-manager.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member, can submit transactions.
    #[sea_orm(string_value = "member")]
    Member,
}

impl From<MemberRole> for BookRole {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Creator => Self::Creator,
            MemberRole::Admin => Self::Admin,
            MemberRole::Member => Self::Member,
        }
    }
}

impl From<BookRole> for MemberRole {
    fn from(role: BookRole) -> Self {
        match role {
            BookRole::Creator => Self::Creator,
            BookRole::Admin => Self::Admin,
            BookRole::Member => Self::Member,
        }
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming into the book.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out of the book.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<TransactionKind> for CoreKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
        }
    }
}

impl From<CoreKind> for TransactionKind {
    fn from(kind: CoreKind) -> Self {
        match kind {
            CoreKind::Income => Self::Income,
            CoreKind::Expense => Self::Expense,
        }
    }
}

/// Approval status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting a decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved, counts toward aggregates.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected, terminal.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<TransactionStatus> for CoreStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Approved => Self::Approved,
            TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CoreStatus> for TransactionStatus {
    fn from(status: CoreStatus) -> Self {
        match status {
            CoreStatus::Pending => Self::Pending,
            CoreStatus::Approved => Self::Approved,
            CoreStatus::Rejected => Self::Rejected,
        }
    }
}
