//! Request and response bodies for the five TPC-C transactions.
//!
//! Monetary values in responses arrive as decimal strings and are parsed into
//! [`Decimal`] so no consumer ever does arithmetic on floats.

use crate::identifiers::{CustomerId, DistrictId, ItemId, OrderId, WarehouseId};
use crate::kind::TransactionKind;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════════

/// One line of a New-Order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub item_id: ItemId,
    /// Defaults to the order's home warehouse. A different value makes this
    /// a remote order line.
    pub supply_warehouse_id: WarehouseId,
    pub quantity: u16,
}

impl OrderLineRequest {
    /// Whether this line is supplied by a warehouse other than `home`.
    pub fn is_remote(&self, home: WarehouseId) -> bool {
        self.supply_warehouse_id != home
    }
}

/// `POST /new-order` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub customer_id: CustomerId,
    pub order_lines: Vec<OrderLineRequest>,
}

impl NewOrderRequest {
    /// Whether every line is supplied by the home warehouse.
    pub fn is_all_local(&self) -> bool {
        self.order_lines
            .iter()
            .all(|line| !line.is_remote(self.warehouse_id))
    }
}

/// `POST /payment` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub customer_id: CustomerId,
    /// Sent as a JSON number; the value always carries scale 2.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// `GET /order-status` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusQuery {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub customer_id: CustomerId,
}

/// `POST /delivery` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
}

/// `GET /stock-level` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevelQuery {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub threshold: u16,
}

/// A fully-parameterized transaction, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionRequest {
    NewOrder(NewOrderRequest),
    Payment(PaymentRequest),
    OrderStatus(OrderStatusQuery),
    Delivery(DeliveryRequest),
    StockLevel(StockLevelQuery),
}

impl TransactionRequest {
    /// The kind of this request.
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionRequest::NewOrder(_) => TransactionKind::NewOrder,
            TransactionRequest::Payment(_) => TransactionKind::Payment,
            TransactionRequest::OrderStatus(_) => TransactionKind::OrderStatus,
            TransactionRequest::Delivery(_) => TransactionKind::Delivery,
            TransactionRequest::StockLevel(_) => TransactionKind::StockLevel,
        }
    }

    /// Home warehouse of the request.
    pub fn warehouse_id(&self) -> WarehouseId {
        match self {
            TransactionRequest::NewOrder(r) => r.warehouse_id,
            TransactionRequest::Payment(r) => r.warehouse_id,
            TransactionRequest::OrderStatus(r) => r.warehouse_id,
            TransactionRequest::Delivery(r) => r.warehouse_id,
            TransactionRequest::StockLevel(r) => r.warehouse_id,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════════

/// Customer block of a New-Order response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub last_name: String,
    pub credit: String,
    pub discount: Decimal,
}

/// Priced line of a New-Order response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineSummary {
    pub item_id: ItemId,
    pub supply_warehouse_id: WarehouseId,
    pub quantity: u16,
    pub item_name: String,
    pub item_price: Decimal,
    pub stock_quantity: i32,
    pub brand_generic: String,
    pub line_amount: Decimal,
}

/// `POST /new-order` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderResponse {
    pub order_id: OrderId,
    pub customer: CustomerSummary,
    pub warehouse_tax: Decimal,
    pub district_tax: Decimal,
    pub order_entry_date: NaiveDateTime,
    pub total_amount: Decimal,
    pub order_lines: Vec<OrderLineSummary>,
}

/// Warehouse block of a Payment response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentWarehouse {
    pub w_id: WarehouseId,
    pub w_name: String,
    #[serde(default)]
    pub w_city: String,
    #[serde(default)]
    pub w_state: String,
}

/// District block of a Payment response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDistrict {
    pub d_id: DistrictId,
    pub d_name: String,
    #[serde(default)]
    pub d_city: String,
    #[serde(default)]
    pub d_state: String,
}

/// Customer block of a Payment response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub c_id: CustomerId,
    #[serde(default)]
    pub c_first: String,
    #[serde(default)]
    pub c_middle: String,
    #[serde(default)]
    pub c_last: String,
    #[serde(default)]
    pub c_credit: String,
    pub c_discount: Decimal,
    pub c_balance: Decimal,
}

/// `POST /payment` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub warehouse: PaymentWarehouse,
    pub district: PaymentDistrict,
    pub customer: PaymentCustomer,
    pub payment_date: NaiveDateTime,
    pub payment_amount: Decimal,
}

/// Customer block of an Order-Status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCustomer {
    pub c_id: CustomerId,
    pub c_first: Option<String>,
    pub c_middle: Option<String>,
    pub c_last: Option<String>,
    pub c_balance: Option<Decimal>,
}

/// Most recent order of the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestOrder {
    pub o_id: OrderId,
    pub o_entry_d: Option<NaiveDateTime>,
    pub o_carrier_id: Option<u16>,
}

/// Line of the most recent order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusOrderLine {
    pub ol_i_id: Option<ItemId>,
    pub ol_supply_w_id: Option<WarehouseId>,
    pub ol_quantity: Option<u16>,
    pub ol_amount: Option<Decimal>,
    pub ol_delivery_d: Option<NaiveDateTime>,
}

/// `GET /order-status` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub customer: StatusCustomer,
    pub latest_order: LatestOrder,
    pub order_lines: Vec<StatusOrderLine>,
}

/// One order delivered by a Delivery transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredOrder {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub carrier_id: u16,
    pub order_line_count: usize,
    pub total_amount: Decimal,
}

/// `POST /delivery` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub delivery_date: NaiveDateTime,
    #[serde(default)]
    pub delivered_orders: Vec<DeliveredOrder>,
    pub total_orders_delivered: usize,
}

/// `GET /stock-level` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevelResponse {
    pub warehouse_id: WarehouseId,
    pub district_id: DistrictId,
    pub threshold: u16,
    pub low_stock_count: i64,
}
