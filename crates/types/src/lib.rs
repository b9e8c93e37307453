//! Wire types for the TPC-C order-processing API.
//!
//! Shared by the load generator and the order-entry client. Nothing here does
//! I/O; these are the request and response shapes plus the small amount of
//! logic that belongs to them (kind parsing, remote-line detection).

pub mod catalog;
pub mod identifiers;
pub mod kind;
pub mod orders;
pub mod transactions;

pub use catalog::{Customer, District, Item, StockInfo, Warehouse};
pub use identifiers::{CustomerId, DistrictId, ItemId, OrderId, WarehouseId};
pub use kind::{TransactionKind, UnknownKind};
pub use orders::{
    DeliveryStatus, OrderSummary, OrdersListResponse, OrdersQuery, SortBy, SortDirection};
pub use transactions::{
    CustomerSummary, DeliveredOrder, DeliveryRequest, DeliveryResponse, LatestOrder,
    NewOrderRequest, NewOrderResponse, OrderLineRequest, OrderLineSummary, OrderStatusQuery,
    OrderStatusResponse, PaymentCustomer, PaymentDistrict, PaymentRequest, PaymentResponse,
    PaymentWarehouse, StatusCustomer, StatusOrderLine, StockLevelQuery, StockLevelResponse,
    TransactionRequest,
};

pub use rust_decimal::Decimal;
