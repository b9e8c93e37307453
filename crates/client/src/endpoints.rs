//! API paths.

use reqwest::Method;
use tpcc_types::TransactionKind;

pub const NEW_ORDER: &str = "/new-order";
pub const PAYMENT: &str = "/payment";
pub const ORDER_STATUS: &str = "/order-status";
pub const DELIVERY: &str = "/delivery";
pub const STOCK_LEVEL: &str = "/stock-level";

pub const ORDERS: &str = "/orders";
pub const WAREHOUSES: &str = "/warehouses";
pub const DISTRICTS: &str = "/districts";
pub const CUSTOMERS: &str = "/customers";
pub const ITEMS: &str = "/items";
pub const STOCK: &str = "/stock";

/// HTTP method and path for a transaction kind.
pub fn route(kind: TransactionKind) -> (Method, &'static str) {
    match kind {
        TransactionKind::NewOrder => (Method::POST, NEW_ORDER),
        TransactionKind::Payment => (Method::POST, PAYMENT),
        TransactionKind::OrderStatus => (Method::GET, ORDER_STATUS),
        TransactionKind::Delivery => (Method::POST, DELIVERY),
        TransactionKind::StockLevel => (Method::GET, STOCK_LEVEL),
    }
}
