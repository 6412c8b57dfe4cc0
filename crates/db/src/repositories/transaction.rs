//! Ledger repository: submit, decide, delete, and list transactions.
//!
//! Decisions use a conditional update (`WHERE status = 'pending'`) so two
//! racing deciders serialize at the database: exactly one sees a row
//! updated, the other gets the transaction's actual current status back.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use hearth_core::budget::{BookSummary, BudgetService};
use hearth_core::policy::{BookAction, PolicyEngine, PolicyError};
use hearth_core::workflow::{Decision, TransactionKind, TransactionStatus, WorkflowError, WorkflowService};

use crate::entities::{books, sea_orm_active_enums, transactions, users};
use crate::repositories::member::member_role;

/// Errors for ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Book not found.
    #[error("book {0} not found")]
    BookNotFound(Uuid),

    /// Amount must be positive.
    #[error("amount must be a positive number of minor units")]
    InvalidAmount,

    /// Description must not be empty after trimming.
    #[error("description must not be empty")]
    EmptyDescription,

    /// The actor is not allowed to perform the operation.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The transaction is missing or no longer pending.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BookNotFound(_) => 404,
            Self::InvalidAmount | Self::EmptyDescription => 400,
            Self::Policy(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BookNotFound(_) => "not_found",
            Self::InvalidAmount => "invalid_amount",
            Self::EmptyDescription => "invalid_description",
            Self::Policy(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Database(_) => "internal_error",
        }
    }
}

/// Input for submitting a transaction.
#[derive(Debug, Clone)]
pub struct SubmitTransactionInput {
    /// Income or expense.
    pub kind: TransactionKind,
    /// Free-text category.
    pub category: String,
    /// Amount in minor units, must be positive.
    pub amount: i64,
    /// Free-text description, must be non-empty.
    pub description: String,
    /// Effective date of the transaction.
    pub date: NaiveDate,
}

/// Filter for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Keep only transactions with this status.
    pub status: Option<TransactionStatus>,
    /// Case-insensitive substring match on description, category, or
    /// submitter name.
    pub search: Option<String>,
}

/// A transaction joined with its submitter's name.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// The transaction row.
    pub transaction: transactions::Model,
    /// Display name of the submitting user.
    pub submitter_name: String,
}

/// A filtered transaction listing plus the book's budget summary.
///
/// The summary always covers the whole book, not the filtered subset.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    /// Transactions matching the filter, newest first.
    pub transactions: Vec<TransactionRecord>,
    /// Aggregates over all approved transactions in the book.
    pub summary: BookSummary,
}

/// Ledger repository for transaction workflow operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a new transaction, always in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount or empty
    /// description, and a policy error when the submitter is not a
    /// member. Validation failures apply nothing.
    pub async fn submit(
        &self,
        book_id: Uuid,
        submitter_id: Uuid,
        input: SubmitTransactionInput,
    ) -> Result<transactions::Model, LedgerError> {
        let role = self.require_role(book_id, submitter_id).await?;
        PolicyEngine::authorize(Some(role.into()), &BookAction::SubmitTransaction)?;

        if input.amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(LedgerError::EmptyDescription);
        }

        let now = chrono::Utc::now().into();
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            user_id: Set(submitter_id),
            kind: Set(input.kind.into()),
            category: Set(input.category.trim().to_string()),
            amount: Set(input.amount),
            description: Set(description),
            date: Set(input.date),
            status: Set(sea_orm_active_enums::TransactionStatus::Pending),
            decided_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(transaction.insert(&self.db).await?)
    }

    /// Approves or rejects a pending transaction.
    ///
    /// The status change is a conditional update on `status = 'pending'`;
    /// under a decide race exactly one caller wins and the loser receives
    /// `AlreadyDecided` with the transaction's actual current status.
    ///
    /// # Errors
    ///
    /// Returns a policy error when the decider cannot approve, and a
    /// workflow error for a missing or already-decided transaction.
    pub async fn decide(
        &self,
        book_id: Uuid,
        transaction_id: Uuid,
        decider_id: Uuid,
        decision: Decision,
    ) -> Result<transactions::Model, LedgerError> {
        let role = self.require_role(book_id, decider_id).await?;
        PolicyEngine::authorize(Some(role.into()), &BookAction::DecideTransaction)?;

        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::BookId.eq(book_id))
            .one(&self.db)
            .await?
            .ok_or(WorkflowError::TransactionNotFound(transaction_id))?;

        let stamp = WorkflowService::decide(transaction.status.into(), decider_id, decision)?;
        let new_status = sea_orm_active_enums::TransactionStatus::from(stamp.new_status);

        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::Status, Expr::value(new_status))
            .col_expr(transactions::Column::DecidedBy, Expr::value(stamp.decided_by))
            .col_expr(
                transactions::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(stamp.decided_at)),
            )
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::BookId.eq(book_id))
            .filter(
                transactions::Column::Status
                    .eq(sea_orm_active_enums::TransactionStatus::Pending),
            )
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            // Lost a race: report the status the winner left behind.
            let current = transactions::Entity::find_by_id(transaction_id)
                .filter(transactions::Column::BookId.eq(book_id))
                .one(&self.db)
                .await?
                .ok_or(WorkflowError::TransactionNotFound(transaction_id))?;
            return Err(WorkflowError::AlreadyDecided {
                current: current.status.into(),
            }
            .into());
        }

        let updated = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await?
            .ok_or(WorkflowError::TransactionNotFound(transaction_id))?;

        Ok(updated)
    }

    /// Hard-deletes a transaction, regardless of its status.
    ///
    /// # Errors
    ///
    /// Returns a policy error unless the requester is creator, admin, or
    /// the transaction's own submitter.
    pub async fn delete(
        &self,
        book_id: Uuid,
        transaction_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), LedgerError> {
        let role = self.require_role(book_id, requester_id).await?;

        let transaction = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::BookId.eq(book_id))
            .one(&self.db)
            .await?
            .ok_or(WorkflowError::TransactionNotFound(transaction_id))?;

        PolicyEngine::authorize(
            Some(role.into()),
            &BookAction::DeleteTransaction {
                own_submission: transaction.user_id == requester_id,
            },
        )?;

        transactions::Entity::delete_by_id(transaction.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Lists the book's transactions, newest first, with the budget
    /// summary over the whole book.
    ///
    /// Status and search filters narrow the listing only; aggregates are
    /// always computed from every approved transaction in the book.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` for an unknown book and a policy error when
    /// the viewer is not a member.
    pub async fn list(
        &self,
        book_id: Uuid,
        viewer_id: Uuid,
        filter: TransactionFilter,
    ) -> Result<TransactionPage, LedgerError> {
        let book = books::Entity::find_by_id(book_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::BookNotFound(book_id))?;
        if member_role(&self.db, book_id, viewer_id).await?.is_none() {
            return Err(PolicyError::NotMember.into());
        }

        let rows = transactions::Entity::find()
            .filter(transactions::Column::BookId.eq(book_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        let summary = BudgetService::summarize(
            book.budget,
            rows.iter()
                .map(|(t, _)| (t.kind.into(), t.status.into(), t.amount)),
        );

        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let transactions = rows
            .into_iter()
            .map(|(transaction, user)| TransactionRecord {
                transaction,
                submitter_name: user.map(|u| u.name).unwrap_or_default(),
            })
            .filter(|record| {
                filter
                    .status
                    .is_none_or(|s| TransactionStatus::from(record.transaction.status) == s)
            })
            .filter(|record| {
                needle.as_deref().is_none_or(|needle| {
                    record.transaction.description.to_lowercase().contains(needle)
                        || record.transaction.category.to_lowercase().contains(needle)
                        || record.submitter_name.to_lowercase().contains(needle)
                })
            })
            .collect();

        Ok(TransactionPage {
            transactions,
            summary,
        })
    }

    async fn require_role(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<sea_orm_active_enums::MemberRole, LedgerError> {
        let exists = books::Entity::find_by_id(book_id).one(&self.db).await?;
        if exists.is_none() {
            return Err(LedgerError::BookNotFound(book_id));
        }
        member_role(&self.db, book_id, user_id)
            .await?
            .ok_or_else(|| PolicyError::NotMember.into())
    }
}
