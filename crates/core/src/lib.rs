//! Core business logic for Hearth.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain rules, state transitions, and calculations
//! live here.
//!
//! # Modules
//!
//! - `policy` - Role-based authorization decisions for book actions
//! - `workflow` - Transaction approval state machine
//! - `budget` - Budget aggregation over approved transactions
//! - `invite` - Invitation code generation and validation
//! - `auth` - Password hashing

pub mod auth;
pub mod budget;
pub mod invite;
pub mod policy;
pub mod workflow;
