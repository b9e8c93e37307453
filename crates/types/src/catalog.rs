//! Catalog records browsed by the order-entry client.

use crate::identifiers::{CustomerId, DistrictId, ItemId, WarehouseId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub w_id: WarehouseId,
    pub w_name: String,
    pub w_street_1: Option<String>,
    pub w_street_2: Option<String>,
    pub w_city: Option<String>,
    pub w_state: Option<String>,
    pub w_zip: Option<String>,
    pub w_tax: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub d_id: DistrictId,
    pub d_w_id: WarehouseId,
    pub d_name: String,
    pub d_street_1: Option<String>,
    pub d_street_2: Option<String>,
    pub d_city: Option<String>,
    pub d_state: Option<String>,
    pub d_zip: Option<String>,
    pub d_tax: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub c_id: CustomerId,
    pub c_d_id: DistrictId,
    pub c_w_id: WarehouseId,
    #[serde(default)]
    pub c_first: String,
    #[serde(default)]
    pub c_middle: String,
    #[serde(default)]
    pub c_last: String,
    pub c_phone: Option<String>,
    pub c_credit: Option<String>,
    pub c_credit_lim: Option<i64>,
    pub c_discount: Option<Decimal>,
    pub c_balance: Option<Decimal>,
}

impl Customer {
    /// "First Middle Last", skipping empty parts.
    pub fn display_name(&self) -> String {
        [&self.c_first, &self.c_middle, &self.c_last]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub i_id: ItemId,
    pub i_im_id: Option<i32>,
    pub i_name: Option<String>,
    /// Unit price; absent for items the API could not price.
    pub i_price: Option<Decimal>,
    pub i_data: Option<String>,
}

/// `GET /stock` response for one (warehouse, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub s_quantity: i32,
    pub s_ytd: Option<Decimal>,
    pub s_order_cnt: i32,
    pub s_remote_cnt: i32,
    pub s_data: Option<String>,
}

impl StockInfo {
    /// Whether the stock cannot cover `requested` units.
    pub fn is_short_for(&self, requested: i32) -> bool {
        self.s_quantity < requested
    }
}
