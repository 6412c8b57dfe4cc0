//! Transaction approval workflow.
//!
//! Implements the three-state lifecycle every transaction moves through:
//! created `pending`, then decided exactly once into `approved` or
//! `rejected`. Terminal states never transition again; a rejected
//! transaction is replaced by submitting a new one.
//!
//! # Modules
//!
//! - `types` - Status, kind, and decision types
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{Decision, DecisionStamp, TransactionKind, TransactionStatus};
