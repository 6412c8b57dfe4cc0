//! Role-based authorization for book actions.
//!
//! Every permission decision in Hearth goes through this module. The
//! presentation and persistence layers never re-implement role checks;
//! they pass the actor's role and the requested action to
//! [`PolicyEngine::authorize`] and act on the answer.
//!
//! # Modules
//!
//! - `types` - Roles, actions, and target context
//! - `error` - Policy denial errors
//! - `service` - The decision function

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PolicyError;
pub use service::PolicyEngine;
pub use types::{BookAction, BookRole, MemberTarget};
