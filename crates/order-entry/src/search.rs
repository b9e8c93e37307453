//! Debounced customer and item search.
//!
//! Each call to [`DebouncedSearch::set_query`] starts a new generation,
//! cancels the pending timer and schedules a fetch once the debounce window
//! passes quietly. Results are applied only if their generation is still the
//! latest, so a slow response to an old query can never overwrite a newer
//! one.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tpcc_client::{ApiClient, ApiError, DEFAULT_SEARCH_LIMIT};
use tpcc_types::{Customer, DistrictId, Item, WarehouseId};
use tracing::debug;

/// Quiet period before a search is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A failed search, kept as a message for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Search failed: {0}")]
pub struct SearchError(pub String);

impl From<ApiError> for SearchError {
    fn from(e: ApiError) -> Self {
        SearchError(e.to_string())
    }
}

/// Backend for a [`DebouncedSearch`].
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    /// Run one search. `query` is already trimmed and may be empty.
    async fn search(&self, query: &str) -> Result<Vec<Self::Item>, SearchError>;
}

/// Customers of one district.
pub struct CustomerSearch {
    client: ApiClient,
    warehouse_id: WarehouseId,
    district_id: DistrictId,
}

impl CustomerSearch {
    pub fn new(client: ApiClient, warehouse_id: WarehouseId, district_id: DistrictId) -> Self {
        Self {
            client,
            warehouse_id,
            district_id,
        }
    }
}

#[async_trait]
impl SearchSource for CustomerSearch {
    type Item = Customer;

    async fn search(&self, query: &str) -> Result<Vec<Customer>, SearchError> {
        Ok(self
            .client
            .search_customers(self.warehouse_id, self.district_id, query, DEFAULT_SEARCH_LIMIT)
            .await?)
    }
}

/// Items stocked by one warehouse.
pub struct ItemSearch {
    client: ApiClient,
    warehouse_id: WarehouseId,
}

impl ItemSearch {
    pub fn new(client: ApiClient, warehouse_id: WarehouseId) -> Self {
        Self {
            client,
            warehouse_id,
        }
    }
}

#[async_trait]
impl SearchSource for ItemSearch {
    type Item = Item;

    async fn search(&self, query: &str) -> Result<Vec<Item>, SearchError> {
        Ok(self
            .client
            .search_items(self.warehouse_id, query, DEFAULT_SEARCH_LIMIT)
            .await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Debouncing,
    Fetching,
}

struct SearchState<T> {
    generation: u64,
    query: String,
    phase: Phase,
    results: Vec<T>,
    error: Option<SearchError>,
}

/// Search box state with debouncing and out-of-order protection.
///
/// Must be used inside a tokio runtime; fetches run as spawned tasks.
pub struct DebouncedSearch<S: SearchSource> {
    source: Arc<S>,
    window: Duration,
    state: Arc<Mutex<SearchState<S::Item>>>,
    timer: CancellationToken,
}

impl<S: SearchSource> DebouncedSearch<S> {
    pub fn new(source: S) -> Self {
        Self::with_window(source, DEFAULT_DEBOUNCE)
    }

    pub fn with_window(source: S, window: Duration) -> Self {
        Self {
            source: Arc::new(source),
            window,
            state: Arc::new(Mutex::new(SearchState {
                generation: 0,
                query: String::new(),
                phase: Phase::Idle,
                results: Vec::new(),
                error: None,
            })),
            timer: CancellationToken::new(),
        }
    }

    /// Record new input and schedule a search for it.
    pub fn set_query(&mut self, query: &str) {
        self.timer.cancel();
        self.timer = CancellationToken::new();

        let query = query.trim().to_string();
        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.query = query.clone();
            state.phase = Phase::Debouncing;
            state.generation
        };

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let timer = self.timer.clone();
        let window = self.window;

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(window) => {}
                _ = timer.cancelled() => return,
            }

            {
                let mut state = state.lock();
                if state.generation != generation {
                    return;
                }
                state.phase = Phase::Fetching;
            }

            let result = source.search(&query).await;

            let mut state = state.lock();
            if state.generation != generation {
                debug!(generation, latest = state.generation, "Discarding superseded search result");
                return;
            }
            match result {
                Ok(results) => {
                    state.results = results;
                    state.error = None;
                }
                Err(e) => state.error = Some(e),
            }
            state.phase = Phase::Idle;
        });
    }

    /// The latest query, trimmed.
    pub fn query(&self) -> String {
        self.state.lock().query.clone()
    }

    /// Results of the most recent completed search.
    pub fn results(&self) -> Vec<S::Item> {
        self.state.lock().results.clone()
    }

    /// Error from the most recent completed search, if it failed.
    pub fn error(&self) -> Option<SearchError> {
        self.state.lock().error.clone()
    }

    /// True while waiting out the debounce window or fetching.
    pub fn is_searching(&self) -> bool {
        self.state.lock().phase != Phase::Idle
    }

    /// True only while the latest search is in flight.
    pub fn is_fetching(&self) -> bool {
        self.state.lock().phase == Phase::Fetching
    }
}

impl<S: SearchSource> Drop for DebouncedSearch<S> {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}
