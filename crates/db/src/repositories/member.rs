//! Membership repository: join, promote, demote, remove, leave.
//!
//! Every mutation runs inside a database transaction and re-checks the
//! creator and last-approver invariants there, so the book can never lose
//! its last approval-capable member under concurrent requests.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use hearth_core::invite::{InviteCodeError, normalize_code};
use hearth_core::policy::{BookAction, MemberTarget, PolicyEngine, PolicyError};

use crate::entities::{book_members, books, sea_orm_active_enums::MemberRole, users};

/// Errors for membership operations.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Book not found.
    #[error("book {0} not found")]
    BookNotFound(Uuid),

    /// The target user is not a member of the book.
    #[error("user {0} is not a member of this book")]
    MemberNotFound(Uuid),

    /// The invitation code is well-formed but matches no book.
    #[error("invitation code does not match any book")]
    InvalidCode,

    /// The invitation code is malformed.
    #[error(transparent)]
    CodeFormat(#[from] InviteCodeError),

    /// The user already belongs to the book.
    #[error("you are already a member of this book")]
    AlreadyMember,

    /// The actor is not allowed to perform the operation.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for MemberError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl MemberError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BookNotFound(_) | Self::MemberNotFound(_) | Self::InvalidCode => 404,
            Self::CodeFormat(e) => e.status_code(),
            Self::AlreadyMember => 409,
            Self::Policy(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BookNotFound(_) | Self::MemberNotFound(_) => "not_found",
            Self::InvalidCode => "invalid_code",
            Self::CodeFormat(e) => e.error_code(),
            Self::AlreadyMember => "already_member",
            Self::Policy(e) => e.error_code(),
            Self::Database(_) => "internal_error",
        }
    }
}

/// A membership row joined with its user.
#[derive(Debug, Clone)]
pub struct MemberWithUser {
    /// The member's user record.
    pub user: users::Model,
    /// The membership itself.
    pub membership: book_members::Model,
}

/// Looks up a user's role in a book, if any.
pub(crate) async fn member_role<C: ConnectionTrait>(
    conn: &C,
    book_id: Uuid,
    user_id: Uuid,
) -> Result<Option<MemberRole>, DbErr> {
    let membership = book_members::Entity::find()
        .filter(book_members::Column::BookId.eq(book_id))
        .filter(book_members::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    Ok(membership.map(|m| m.role))
}

/// Counts the book's approval-capable members (creator plus admins).
async fn approver_count<C: ConnectionTrait>(conn: &C, book_id: Uuid) -> Result<u64, DbErr> {
    book_members::Entity::find()
        .filter(book_members::Column::BookId.eq(book_id))
        .filter(
            Condition::any()
                .add(book_members::Column::Role.eq(MemberRole::Creator))
                .add(book_members::Column::Role.eq(MemberRole::Admin)),
        )
        .count(conn)
        .await
}

/// Membership repository.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new membership repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the book's members with their user records.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` for an unknown book and a policy error when
    /// the actor is not a member.
    pub async fn list(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Vec<MemberWithUser>, MemberError> {
        self.require_book(book_id).await?;
        if member_role(&self.db, book_id, actor_id).await?.is_none() {
            return Err(PolicyError::NotMember.into());
        }

        let rows = book_members::Entity::find()
            .filter(book_members::Column::BookId.eq(book_id))
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| {
                user.map(|u| MemberWithUser {
                    user: u,
                    membership,
                })
            })
            .collect())
    }

    /// Redeems an invitation code, joining the user as a `member`.
    ///
    /// The code is normalized (trimmed, uppercased) before lookup, so
    /// redemption is effectively case-insensitive. Lookup and insert run
    /// in one transaction: a code invalidated by a concurrent
    /// regeneration is not honored.
    ///
    /// # Errors
    ///
    /// Returns `CodeFormat` for a malformed code, `InvalidCode` when no
    /// book carries it, and `AlreadyMember` for existing members.
    pub async fn redeem_code(
        &self,
        raw_code: &str,
        user_id: Uuid,
    ) -> Result<(books::Model, book_members::Model), MemberError> {
        let code = normalize_code(raw_code)?;

        let txn = self.db.begin().await?;

        let book = books::Entity::find()
            .filter(books::Column::InvitationCode.eq(&code))
            .one(&txn)
            .await?
            .ok_or(MemberError::InvalidCode)?;

        if member_role(&txn, book.id, user_id).await?.is_some() {
            return Err(MemberError::AlreadyMember);
        }

        let membership = book_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book.id),
            user_id: Set(user_id),
            role: Set(MemberRole::Member),
            joined_at: Set(chrono::Utc::now().into()),
        };
        let membership = membership.insert(&txn).await?;

        txn.commit().await?;

        Ok((book, membership))
    }

    /// Promotes a member to admin. Creator only.
    ///
    /// # Errors
    ///
    /// Returns a policy error when the actor is not the creator, the
    /// target is not a plain member, or the target is the actor.
    pub async fn promote(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<book_members::Model, MemberError> {
        self.change_role(book_id, actor_id, target_user_id, true).await
    }

    /// Demotes an admin back to member. Creator only.
    ///
    /// # Errors
    ///
    /// Returns a policy error when the actor is not the creator, the
    /// target is not an admin, or demoting would leave the book without
    /// an approval-capable member.
    pub async fn demote(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<book_members::Model, MemberError> {
        self.change_role(book_id, actor_id, target_user_id, false).await
    }

    /// Removes a member from the book.
    ///
    /// # Errors
    ///
    /// Returns a policy error when the actor lacks the role, targets
    /// themself or the creator, or would remove the last approver.
    pub async fn remove(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), MemberError> {
        self.require_book(book_id).await?;

        let txn = self.db.begin().await?;

        let actor = member_role(&txn, book_id, actor_id).await?;
        let target_row = book_members::Entity::find()
            .filter(book_members::Column::BookId.eq(book_id))
            .filter(book_members::Column::UserId.eq(target_user_id))
            .one(&txn)
            .await?
            .ok_or(MemberError::MemberNotFound(target_user_id))?;

        let target = Self::target_context(&txn, book_id, actor_id, &target_row).await?;
        PolicyEngine::authorize(
            actor.map(Into::into),
            &BookAction::RemoveMember { target },
        )?;

        book_members::Entity::delete_by_id(target_row.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Leaves the book voluntarily. The creator can never leave.
    ///
    /// # Errors
    ///
    /// Returns `CreatorCannotLeave` for the creator and `NotMember` for
    /// non-members.
    pub async fn leave(&self, book_id: Uuid, user_id: Uuid) -> Result<(), MemberError> {
        self.require_book(book_id).await?;

        let txn = self.db.begin().await?;

        let membership = book_members::Entity::find()
            .filter(book_members::Column::BookId.eq(book_id))
            .filter(book_members::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(PolicyError::NotMember)?;

        PolicyEngine::authorize(Some(membership.role.into()), &BookAction::LeaveBook)?;

        book_members::Entity::delete_by_id(membership.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn change_role(
        &self,
        book_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
        promote: bool,
    ) -> Result<book_members::Model, MemberError> {
        self.require_book(book_id).await?;

        let txn = self.db.begin().await?;

        let actor = member_role(&txn, book_id, actor_id).await?;
        let target_row = book_members::Entity::find()
            .filter(book_members::Column::BookId.eq(book_id))
            .filter(book_members::Column::UserId.eq(target_user_id))
            .one(&txn)
            .await?
            .ok_or(MemberError::MemberNotFound(target_user_id))?;

        let target = Self::target_context(&txn, book_id, actor_id, &target_row).await?;
        let action = if promote {
            BookAction::PromoteMember { target }
        } else {
            BookAction::DemoteAdmin { target }
        };
        PolicyEngine::authorize(actor.map(Into::into), &action)?;

        let new_role = if promote {
            MemberRole::Admin
        } else {
            MemberRole::Member
        };
        let mut active: book_members::ActiveModel = target_row.into();
        active.role = Set(new_role);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Builds the policy target context for a membership row, inside the
    /// caller's transaction.
    async fn target_context<C: ConnectionTrait>(
        conn: &C,
        book_id: Uuid,
        actor_id: Uuid,
        target_row: &book_members::Model,
    ) -> Result<MemberTarget, MemberError> {
        let approvers = approver_count(conn, book_id).await?;
        let target_is_approver = matches!(
            target_row.role,
            MemberRole::Creator | MemberRole::Admin
        );

        Ok(MemberTarget {
            role: target_row.role.into(),
            is_self: target_row.user_id == actor_id,
            is_last_approver: target_is_approver && approvers <= 1,
        })
    }

    async fn require_book(&self, book_id: Uuid) -> Result<books::Model, MemberError> {
        books::Entity::find_by_id(book_id)
            .one(&self.db)
            .await?
            .ok_or(MemberError::BookNotFound(book_id))
    }
}
