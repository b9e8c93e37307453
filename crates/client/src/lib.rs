//! HTTP client for the TPC-C order-processing API.
//!
//! Two surfaces share one connection pool:
//!
//! - [`ApiClient::dispatch`] sends a [`TransactionRequest`](tpcc_types::TransactionRequest)
//!   and hands back the raw status and body, for the load generator's own
//!   classification.
//! - Typed methods ([`ApiClient::new_order`], [`ApiClient::list_orders`], ...)
//!   decode bodies into `tpcc-types` records for the order-entry client.
//!
//! Nothing here retries. A retried payment could double-submit, and a retried
//! load-test request would hide the failure rate being measured.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_SEARCH_LIMIT};
pub use config::{ClientConfig, API_BASE_ENV, DEFAULT_API_BASE};
pub use error::ApiError;
pub use types::RawResponse;
