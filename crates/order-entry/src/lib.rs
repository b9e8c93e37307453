//! Order-entry client for the TPC-C order-processing API.
//!
//! The pieces a human-facing order screen needs, without the screen:
//!
//! - [`OrderFormState`]: the form, changed only through [`FormEvent`]s.
//!   Upstream selections invalidate downstream ones in a single step.
//! - [`validate_order`]: the client-side checks run before submission.
//! - [`DebouncedSearch`]: customer and item lookup that waits for typing to
//!   settle and ignores stale responses.
//! - [`OrderBrowser`]: filter, paging and sort state for the order list.
//! - [`OrderService`]: submission and catalog lookups over
//!   [`tpcc_client::ApiClient`].
//!
//! # Example
//!
//! ```ignore
//! use tpcc_order_entry::{FormEvent, OrderFormState, OrderService};
//!
//! let service = OrderService::from_config(ClientConfig::from_env())?;
//! let form = OrderFormState::new()
//!     .apply(FormEvent::WarehouseSelected(WarehouseId(1)))
//!     .apply(FormEvent::DistrictSelected(DistrictId(3)))
//!     .apply(FormEvent::CustomerSelected(Some(customer)))
//!     .apply(FormEvent::LineItemChanged(0, Some(item)));
//!
//! let placed = service.submit(&form).await?;
//! ```

pub mod browse;
pub mod form;
pub mod search;
pub mod service;
pub mod validation;

pub use browse::{OrderBrowser, DEFAULT_PAGE_SIZE};
pub use form::{is_out_of_stock, FormEvent, OrderFormState, OrderLineDraft};
pub use search::{
    CustomerSearch, DebouncedSearch, ItemSearch, SearchError, SearchSource, DEFAULT_DEBOUNCE,
};
pub use service::{OrderService, SubmitError};
pub use validation::{
    format_validation_errors, validate_order, ValidationError, ValidationResult,
    MAX_LINE_QUANTITY, MAX_ORDER_LINES,
};
