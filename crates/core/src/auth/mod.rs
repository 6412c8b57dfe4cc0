//! Account credential handling.
//!
//! Password hashing and verification with Argon2id. Token issuance lives
//! in `hearth_shared::jwt`; role rules for book membership live in
//! [`crate::policy`].

mod password;

pub use password::{PasswordError, hash_password, verify_password};
