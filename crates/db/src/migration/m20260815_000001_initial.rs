//! Initial schema: users, books, book_members, transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .col(ColumnDef::new(Books::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Books::Name).string().not_null())
                    .col(ColumnDef::new(Books::Description).string())
                    .col(ColumnDef::new(Books::CreatorId).uuid().not_null())
                    .col(ColumnDef::new(Books::Budget).big_integer())
                    .col(ColumnDef::new(Books::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Books::InvitationCode)
                            .string_len(8)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Books::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Books::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_creator")
                            .from(Books::Table, Books::CreatorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookMembers::Table)
                    .col(
                        ColumnDef::new(BookMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookMembers::BookId).uuid().not_null())
                    .col(ColumnDef::new(BookMembers::UserId).uuid().not_null())
                    .col(ColumnDef::new(BookMembers::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(BookMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_members_book")
                            .from(BookMembers::Table, BookMembers::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_members_user")
                            .from(BookMembers::Table, BookMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership per (book, user).
        manager
            .create_index(
                Index::create()
                    .name("idx_book_members_unique")
                    .table(BookMembers::Table)
                    .col(BookMembers::BookId)
                    .col(BookMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::BookId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Transactions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::DecidedBy).uuid())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_book")
                            .from(Transactions::Table, Transactions::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // List queries order by recency within a book.
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_book_created")
                    .table(Transactions::Table)
                    .col(Transactions::BookId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Name,
    Description,
    CreatorId,
    Budget,
    Currency,
    InvitationCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookMembers {
    Table,
    Id,
    BookId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    BookId,
    UserId,
    Kind,
    Category,
    Amount,
    Description,
    Date,
    Status,
    DecidedBy,
    CreatedAt,
    UpdatedAt,
}
