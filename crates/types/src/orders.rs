//! Order listing types (`GET /orders`).

use crate::identifiers::{CustomerId, DistrictId, OrderId, WarehouseId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sortable columns of the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    OrderId,
    #[default]
    EntryDate,
    CustomerLast,
    WarehouseId,
    DistrictId,
    CarrierId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter, pagination and sort parameters for `GET /orders`.
///
/// `None` fields are omitted from the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrdersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_id: Option<DistrictId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// ISO date, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    /// ISO date, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDirection>,
}

/// One row of the order list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub o_id: OrderId,
    pub o_w_id: WarehouseId,
    pub o_d_id: DistrictId,
    pub o_c_id: Option<CustomerId>,
    pub o_entry_d: Option<NaiveDateTime>,
    pub o_carrier_id: Option<u16>,
    pub o_ol_cnt: Option<u16>,
    pub o_all_local: Option<u16>,
    pub customer_first: Option<String>,
    pub customer_middle: Option<String>,
    pub customer_last: Option<String>,
    pub total_amount: Option<Decimal>,
    pub is_delivered: bool,
    pub line_count: i64,
}

/// Whether an order has been assigned a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Delivered,
    Pending,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Delivered => f.write_str("Delivered"),
            DeliveryStatus::Pending => f.write_str("Pending"),
        }
    }
}

impl OrderSummary {
    /// First, middle and last name joined by spaces, skipping blank parts.
    pub fn customer_name(&self) -> String {
        [
            &self.customer_first,
            &self.customer_middle,
            &self.customer_last,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        if self.is_delivered {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::Pending
        }
    }
}

/// Page of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersListResponse {
    pub orders: Vec<OrderSummary>,
    pub total_count: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}
