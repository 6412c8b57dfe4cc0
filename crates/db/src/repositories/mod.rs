//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. They also re-check core invariants inside database
//! transactions so they hold under concurrent requests.

pub mod book;
pub mod member;
pub mod transaction;
pub mod user;

pub use book::{BookError, BookRepository, CreateBookInput, UpdateBookInput};
pub use member::{MemberError, MemberRepository, MemberWithUser};
pub use transaction::{
    LedgerError, LedgerRepository, SubmitTransactionInput, TransactionFilter, TransactionPage,
    TransactionRecord,
};
pub use user::UserRepository;
