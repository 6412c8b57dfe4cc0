//! Book repository for database operations.
//!
//! Books own their memberships and transactions; creating a book also
//! creates the creator membership, in one database transaction.

use std::str::FromStr;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use hearth_core::invite::generate_code;
use hearth_core::policy::{BookAction, PolicyEngine, PolicyError};
use hearth_shared::types::Currency;

use crate::entities::{book_members, books, sea_orm_active_enums::MemberRole};
use crate::repositories::member::member_role;

/// Attempts before giving up on finding an unused invitation code.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Errors for book operations.
#[derive(Debug, Error)]
pub enum BookError {
    /// Book not found.
    #[error("book {0} not found")]
    NotFound(Uuid),

    /// Book name is empty after trimming.
    #[error("book name must not be empty")]
    EmptyName,

    /// Budget must be positive when set.
    #[error("budget must be a positive amount in minor units")]
    InvalidBudget,

    /// Currency code is not supported.
    #[error("unsupported currency: {0}")]
    InvalidCurrency(String),

    /// Could not find an unused invitation code.
    #[error("could not allocate a unique invitation code")]
    CodeExhausted,

    /// The actor is not allowed to perform the operation.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for BookError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl BookError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::EmptyName | Self::InvalidBudget | Self::InvalidCurrency(_) => 400,
            Self::CodeExhausted | Self::Database(_) => 500,
            Self::Policy(e) => e.status_code(),
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::EmptyName => "invalid_name",
            Self::InvalidBudget => "invalid_budget",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::CodeExhausted | Self::Database(_) => "internal_error",
            Self::Policy(e) => e.error_code(),
        }
    }
}

/// Input for creating a book.
#[derive(Debug, Clone)]
pub struct CreateBookInput {
    /// Book name, must be non-empty.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// ISO currency code; defaults to IDR when absent.
    pub currency: Option<String>,
    /// Budget in minor units, must be positive when set.
    pub budget: Option<i64>,
}

/// Input for updating a book. `None` fields are left untouched; the inner
/// `Option` distinguishes "set to null" from "leave alone".
#[derive(Debug, Clone, Default)]
pub struct UpdateBookInput {
    /// New name.
    pub name: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New budget, or `Some(None)` to clear it.
    pub budget: Option<Option<i64>>,
}

/// Book repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: DatabaseConnection,
}

impl BookRepository {
    /// Creates a new book repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a book with the creator as its first member.
    ///
    /// The book row and the creator membership are inserted in one
    /// database transaction; the invitation code is generated here with a
    /// collision retry against the unique index.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, non-positive budget,
    /// or unknown currency, and `CodeExhausted` if no unused invitation
    /// code was found.
    pub async fn create_with_creator(
        &self,
        creator_id: Uuid,
        input: CreateBookInput,
    ) -> Result<books::Model, BookError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(BookError::EmptyName);
        }
        if let Some(budget) = input.budget {
            if budget <= 0 {
                return Err(BookError::InvalidBudget);
            }
        }
        let currency = match input.currency {
            Some(raw) => {
                Currency::from_str(&raw).map_err(|_| BookError::InvalidCurrency(raw))?
            }
            None => Currency::Idr,
        };

        let txn = self.db.begin().await?;

        let code = Self::unused_code(&txn).await?;
        let now = chrono::Utc::now().into();
        let book_id = Uuid::new_v4();

        let book = books::ActiveModel {
            id: Set(book_id),
            name: Set(name),
            description: Set(input.description),
            creator_id: Set(creator_id),
            budget: Set(input.budget),
            currency: Set(currency.to_string()),
            invitation_code: Set(code),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let book = book.insert(&txn).await?;

        let membership = book_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            user_id: Set(creator_id),
            role: Set(MemberRole::Creator),
            joined_at: Set(now),
        };
        membership.insert(&txn).await?;

        txn.commit().await?;

        Ok(book)
    }

    /// Finds a book the user is a member of, with the user's role.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown book and `Policy(NotMember)` when
    /// the user has no membership.
    pub async fn find_for_member(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<(books::Model, MemberRole), BookError> {
        let book = books::Entity::find_by_id(book_id)
            .one(&self.db)
            .await?
            .ok_or(BookError::NotFound(book_id))?;

        let role = member_role(&self.db, book_id, user_id)
            .await?
            .ok_or(PolicyError::NotMember)?;

        Ok((book, role))
    }

    /// Lists all books the user belongs to, with the user's role in each.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(books::Model, MemberRole)>, BookError> {
        let rows = book_members::Entity::find()
            .filter(book_members::Column::UserId.eq(user_id))
            .find_also_related(books::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, book)| book.map(|b| (b, membership.role)))
            .collect())
    }

    /// Updates a book's name, description, or budget.
    ///
    /// # Errors
    ///
    /// Returns a policy error unless the actor is creator or admin, and a
    /// validation error for an empty name or non-positive budget.
    pub async fn update(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
        input: UpdateBookInput,
    ) -> Result<books::Model, BookError> {
        let (book, role) = self.find_for_member(book_id, actor_id).await?;
        PolicyEngine::authorize(Some(role.into()), &BookAction::EditBook)?;

        let mut active: books::ActiveModel = book.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(BookError::EmptyName);
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(budget) = input.budget {
            if let Some(b) = budget {
                if b <= 0 {
                    return Err(BookError::InvalidBudget);
                }
            }
            active.budget = Set(budget);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a book and everything it owns (memberships, transactions).
    ///
    /// # Errors
    ///
    /// Returns a policy error unless the actor is the creator.
    pub async fn delete(&self, book_id: Uuid, actor_id: Uuid) -> Result<(), BookError> {
        let (book, role) = self.find_for_member(book_id, actor_id).await?;
        PolicyEngine::authorize(Some(role.into()), &BookAction::DeleteBook)?;

        books::Entity::delete_by_id(book.id).exec(&self.db).await?;
        Ok(())
    }

    /// Replaces the book's invitation code with a fresh one.
    ///
    /// The old code stops working the moment the update commits; there is
    /// only ever one active code per book.
    ///
    /// # Errors
    ///
    /// Returns a policy error unless the actor is creator or admin.
    pub async fn regenerate_code(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
    ) -> Result<books::Model, BookError> {
        let (book, role) = self.find_for_member(book_id, actor_id).await?;
        PolicyEngine::authorize(Some(role.into()), &BookAction::RegenerateInvitation)?;

        let txn = self.db.begin().await?;
        let code = Self::unused_code(&txn).await?;

        let mut active: books::ActiveModel = book.into();
        active.invitation_code = Set(code);
        active.updated_at = Set(chrono::Utc::now().into());
        let book = active.update(&txn).await?;

        txn.commit().await?;
        Ok(book)
    }

    /// Draws random codes until one is unused, up to a bounded number of
    /// attempts. The unique index on `invitation_code` backs this up.
    async fn unused_code<C: sea_orm::ConnectionTrait>(conn: &C) -> Result<String, BookError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            let taken = books::Entity::find()
                .filter(books::Column::InvitationCode.eq(&code))
                .count(conn)
                .await?;
            if taken == 0 {
                return Ok(code);
            }
        }
        Err(BookError::CodeExhausted)
    }
}
