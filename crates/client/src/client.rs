//! Async HTTP client for the TPC-C API.

use crate::config::ClientConfig;
use crate::endpoints;
use crate::error::ApiError;
use crate::types::RawResponse;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tpcc_types::{
    Customer, DeliveryRequest, DeliveryResponse, District, DistrictId, Item, ItemId,
    NewOrderRequest, NewOrderResponse, OrderStatusQuery, OrderStatusResponse, OrdersListResponse,
    OrdersQuery, PaymentRequest, PaymentResponse, StockInfo, StockLevelQuery, StockLevelResponse,
    TransactionRequest, Warehouse, WarehouseId,
};
use tracing::debug;

/// Default `limit` for customer and item searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

#[derive(Serialize)]
struct SearchParams<'a> {
    warehouse_id: WarehouseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    district_id: Option<DistrictId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    limit: u32,
}

impl<'a> SearchParams<'a> {
    fn new(warehouse_id: WarehouseId, search: &'a str, limit: u32) -> Self {
        let search = search.trim();
        Self {
            warehouse_id,
            district_id: None,
            search: (!search.is_empty()).then_some(search),
            limit,
        }
    }
}

#[derive(Serialize)]
struct StockParams {
    warehouse_id: WarehouseId,
    item_id: ItemId,
}

#[derive(Serialize)]
struct DistrictParams {
    warehouse_id: WarehouseId,
}

/// Client for the TPC-C HTTP API.
///
/// Cheap to clone; clones share one connection pool. No method retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Raw dispatch (load generation)
    // ═══════════════════════════════════════════════════════════════════════

    /// Send a transaction and return the status and body uninterpreted.
    ///
    /// Non-2xx statuses are returned as `Ok`; only transport failures are
    /// errors.
    pub async fn dispatch(&self, request: &TransactionRequest) -> Result<RawResponse, ApiError> {
        let (method, path) = endpoints::route(request.kind());
        let builder = self.http.request(method, self.url(path));
        let builder = match request {
            TransactionRequest::NewOrder(body) => builder.json(body),
            TransactionRequest::Payment(body) => builder.json(body),
            TransactionRequest::OrderStatus(query) => builder.query(query),
            TransactionRequest::Delivery(body) => builder.json(body),
            TransactionRequest::StockLevel(query) => builder.query(query),
        };

        let started = Instant::now();
        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;
        let latency = started.elapsed();

        debug!(kind = %request.kind(), status_code, ?latency, "Dispatched transaction");

        Ok(RawResponse {
            status_code,
            body,
            latency,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Typed transactions
    // ═══════════════════════════════════════════════════════════════════════

    pub async fn new_order(&self, request: &NewOrderRequest) -> Result<NewOrderResponse, ApiError> {
        self.post_json(endpoints::NEW_ORDER, request).await
    }

    pub async fn payment(&self, request: &PaymentRequest) -> Result<PaymentResponse, ApiError> {
        self.post_json(endpoints::PAYMENT, request).await
    }

    pub async fn order_status(
        &self,
        query: &OrderStatusQuery,
    ) -> Result<OrderStatusResponse, ApiError> {
        self.get_json(endpoints::ORDER_STATUS, query).await
    }

    pub async fn delivery(&self, request: &DeliveryRequest) -> Result<DeliveryResponse, ApiError> {
        self.post_json(endpoints::DELIVERY, request).await
    }

    pub async fn stock_level(
        &self,
        query: &StockLevelQuery,
    ) -> Result<StockLevelResponse, ApiError> {
        self.get_json(endpoints::STOCK_LEVEL, query).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Order browsing and catalog
    // ═══════════════════════════════════════════════════════════════════════

    /// List orders matching the query.
    pub async fn list_orders(&self, query: &OrdersQuery) -> Result<OrdersListResponse, ApiError> {
        self.get_json(endpoints::ORDERS, query).await
    }

    pub async fn warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let response = self.http.get(self.url(endpoints::WAREHOUSES)).send().await?;
        Self::decode(response).await
    }

    pub async fn districts(&self, warehouse_id: WarehouseId) -> Result<Vec<District>, ApiError> {
        self.get_json(endpoints::DISTRICTS, &DistrictParams { warehouse_id })
            .await
    }

    /// Search customers of a district. An empty `search` lists the first
    /// `limit` customers.
    pub async fn search_customers(
        &self,
        warehouse_id: WarehouseId,
        district_id: DistrictId,
        search: &str,
        limit: u32,
    ) -> Result<Vec<Customer>, ApiError> {
        let params = SearchParams {
            district_id: Some(district_id),
            ..SearchParams::new(warehouse_id, search, limit)
        };
        self.get_json(endpoints::CUSTOMERS, &params).await
    }

    /// Search items stocked by a warehouse.
    pub async fn search_items(
        &self,
        warehouse_id: WarehouseId,
        search: &str,
        limit: u32,
    ) -> Result<Vec<Item>, ApiError> {
        self.get_json(endpoints::ITEMS, &SearchParams::new(warehouse_id, search, limit))
            .await
    }

    /// Stock of one item in one warehouse. A 404 maps to
    /// [`ApiError::NotFound`].
    pub async fn stock_info(
        &self,
        warehouse_id: WarehouseId,
        item_id: ItemId,
    ) -> Result<StockInfo, ApiError> {
        let params = StockParams {
            warehouse_id,
            item_id,
        };
        match self.get_json(endpoints::STOCK, &params).await {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(ApiError::NotFound(format!(
                    "Stock information for {} in {}",
                    item_id, warehouse_id
                )))
            }
            other => other,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
