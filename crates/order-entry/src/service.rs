//! Order-entry operations over the API client.

use crate::form::{is_out_of_stock, OrderFormState};
use crate::validation::ValidationResult;
use thiserror::Error;
use tpcc_client::{ApiClient, ApiError, ClientConfig, DEFAULT_SEARCH_LIMIT};
use tpcc_types::{
    Customer, CustomerId, District, DistrictId, Item, ItemId, NewOrderResponse,
    OrderStatusQuery, OrderStatusResponse, OrdersListResponse, OrdersQuery, StockInfo,
    Warehouse, WarehouseId,
};
use tracing::{info, warn};

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form failed local validation; nothing was sent.
    #[error("Order is invalid: {0}")]
    Invalid(ValidationResult),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            SubmitError::Invalid(result) => Some(result),
            SubmitError::Api(_) => None,
        }
    }
}

/// Everything the order-entry screens need from the API.
#[derive(Debug, Clone)]
pub struct OrderService {
    client: ApiClient,
}

impl OrderService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::new(config)?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Validate and place the order. The request is sent at most once.
    pub async fn submit(&self, form: &OrderFormState) -> Result<NewOrderResponse, SubmitError> {
        let validation = form.validate();
        if !validation.is_valid {
            return Err(SubmitError::Invalid(validation));
        }
        let Some(request) = form.to_request() else {
            return Err(SubmitError::Invalid(validation));
        };

        match self.client.new_order(&request).await {
            Ok(response) => {
                info!(
                    order_id = %response.order_id,
                    lines = response.order_lines.len(),
                    total = %response.total_amount,
                    "Order placed"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                Err(e.into())
            }
        }
    }

    pub async fn warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        self.client.warehouses().await
    }

    pub async fn districts(&self, warehouse_id: WarehouseId) -> Result<Vec<District>, ApiError> {
        self.client.districts(warehouse_id).await
    }

    pub async fn search_customers(
        &self,
        warehouse_id: WarehouseId,
        district_id: DistrictId,
        search: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Customer>, ApiError> {
        self.client
            .search_customers(
                warehouse_id,
                district_id,
                search,
                limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            )
            .await
    }

    pub async fn search_items(
        &self,
        warehouse_id: WarehouseId,
        search: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Item>, ApiError> {
        self.client
            .search_items(warehouse_id, search, limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .await
    }

    /// Stock of an item; a missing stock row is [`ApiError::NotFound`].
    pub async fn stock_info(
        &self,
        warehouse_id: WarehouseId,
        item_id: ItemId,
    ) -> Result<StockInfo, ApiError> {
        self.client.stock_info(warehouse_id, item_id).await
    }

    /// Whether `quantity` of an item exceeds what the warehouse holds.
    pub async fn check_stock(
        &self,
        warehouse_id: WarehouseId,
        item_id: ItemId,
        quantity: i32,
    ) -> Result<bool, ApiError> {
        let stock = self.stock_info(warehouse_id, item_id).await?;
        Ok(is_out_of_stock(quantity, &stock))
    }

    pub async fn list_orders(&self, query: &OrdersQuery) -> Result<OrdersListResponse, ApiError> {
        self.client.list_orders(query).await
    }

    pub async fn order_status(
        &self,
        warehouse_id: WarehouseId,
        district_id: DistrictId,
        customer_id: CustomerId,
    ) -> Result<OrderStatusResponse, ApiError> {
        self.client
            .order_status(&OrderStatusQuery {
                warehouse_id,
                district_id,
                customer_id,
            })
            .await
    }
}
