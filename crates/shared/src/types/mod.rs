//! Common value types.

pub mod money;

pub use money::Currency;
