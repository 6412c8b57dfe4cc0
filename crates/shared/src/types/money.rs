//! Currency codes for books.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel as `i64` in the smallest currency unit, which keeps
//! sums and balances exact.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the system.
///
/// A book is fixed to a single currency; there is no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indonesian Rupiah
    Idr,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idr => write!(f, "IDR"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Sgd => write!(f, "SGD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IDR" => Ok(Self::Idr),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
