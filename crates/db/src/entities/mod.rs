//! `SeaORM` entity definitions.

pub mod book_members;
pub mod books;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
