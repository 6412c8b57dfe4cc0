//! Invitation code generation and validation.
//!
//! Each book carries exactly one active 8-character join code. Codes are
//! drawn from an alphabet without visually confusable characters (no 0/O,
//! no 1/I) so they survive being read aloud or handwritten.

pub mod code;

pub use code::{CODE_LENGTH, InviteCodeError, generate_code, normalize_code};
