//! The five TPC-C transaction kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A TPC-C transaction kind.
///
/// The declaration order is the canonical order used by the mix selector
/// when accumulating weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    NewOrder,
    Payment,
    OrderStatus,
    Delivery,
    StockLevel,
}

impl TransactionKind {
    /// Number of transaction kinds.
    pub const COUNT: usize = 5;

    /// All kinds in canonical order.
    pub const ALL: [TransactionKind; Self::COUNT] = [
        TransactionKind::NewOrder,
        TransactionKind::Payment,
        TransactionKind::OrderStatus,
        TransactionKind::Delivery,
        TransactionKind::StockLevel,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        match self {
            TransactionKind::NewOrder => 0,
            TransactionKind::Payment => 1,
            TransactionKind::OrderStatus => 2,
            TransactionKind::Delivery => 3,
            TransactionKind::StockLevel => 4,
        }
    }

    /// Stable snake_case name used in config files and reports.
    pub fn name(self) -> &'static str {
        match self {
            TransactionKind::NewOrder => "new_order",
            TransactionKind::Payment => "payment",
            TransactionKind::OrderStatus => "order_status",
            TransactionKind::Delivery => "delivery",
            TransactionKind::StockLevel => "stock_level",
        }
    }

    /// Whether this kind is read-only on the server side.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            TransactionKind::OrderStatus | TransactionKind::StockLevel
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "new_order" | "neworder" => Ok(TransactionKind::NewOrder),
            "payment" => Ok(TransactionKind::Payment),
            "order_status" | "orderstatus" => Ok(TransactionKind::OrderStatus),
            "delivery" => Ok(TransactionKind::Delivery),
            "stock_level" | "stocklevel" => Ok(TransactionKind::StockLevel),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}
