//! Order list query state: filters, paging and sorting.

use tpcc_types::{
    CustomerId, DistrictId, OrderId, OrdersListResponse, OrdersQuery, SortBy, SortDirection,
    WarehouseId,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query state behind the order list view.
///
/// Filter setters only stage values; [`OrderBrowser::search`] commits them
/// by returning to the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBrowser {
    query: OrdersQuery,
}

impl Default for OrderBrowser {
    fn default() -> Self {
        Self {
            query: OrdersQuery {
                page: Some(1),
                per_page: Some(DEFAULT_PAGE_SIZE),
                sort_by: Some(SortBy::EntryDate),
                sort_dir: Some(SortDirection::Desc),
                ..Default::default()
            },
        }
    }
}

impl OrderBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &OrdersQuery {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.query.page.unwrap_or(1)
    }

    pub fn sort(&self) -> (SortBy, SortDirection) {
        (
            self.query.sort_by.unwrap_or_default(),
            self.query.sort_dir.unwrap_or_default(),
        )
    }

    pub fn set_warehouse(&mut self, warehouse_id: Option<WarehouseId>) -> &mut Self {
        self.query.warehouse_id = warehouse_id.filter(|w| w.is_set());
        self
    }

    pub fn set_district(&mut self, district_id: Option<DistrictId>) -> &mut Self {
        self.query.district_id = district_id.filter(|d| d.is_set());
        self
    }

    pub fn set_customer(&mut self, customer_id: Option<CustomerId>) -> &mut Self {
        self.query.customer_id = customer_id;
        self
    }

    pub fn set_order(&mut self, order_id: Option<OrderId>) -> &mut Self {
        self.query.order_id = order_id;
        self
    }

    /// Inclusive date range, as ISO dates. Blank strings clear the bound.
    pub fn set_date_range(&mut self, from: Option<&str>, to: Option<&str>) -> &mut Self {
        let clean = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        self.query.from_date = clean(from);
        self.query.to_date = clean(to);
        self
    }

    pub fn set_page_size(&mut self, per_page: u32) -> &mut Self {
        self.query.per_page = Some(per_page.max(1));
        self.query.page = Some(1);
        self
    }

    /// Apply staged filters from the first page.
    pub fn search(&mut self) -> &OrdersQuery {
        self.query.page = Some(1);
        &self.query
    }

    /// Sort by `field`. Re-selecting the ascending column flips it to
    /// descending; anything else starts ascending.
    pub fn toggle_sort(&mut self, field: SortBy) -> &OrdersQuery {
        let direction = match self.sort() {
            (current, SortDirection::Asc) if current == field => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        self.query.sort_by = Some(field);
        self.query.sort_dir = Some(direction);
        self.query.page = Some(1);
        &self.query
    }

    /// Drop every filter, keeping page size and sort order.
    pub fn clear_filters(&mut self) -> &OrdersQuery {
        self.query = OrdersQuery {
            page: Some(1),
            per_page: self.query.per_page,
            sort_by: self.query.sort_by,
            sort_dir: self.query.sort_dir,
            ..Default::default()
        };
        &self.query
    }

    /// Move to `page`, clamped to at least 1 and, when known, to the last
    /// page of `last`.
    pub fn go_to_page(&mut self, page: u32, last: Option<&OrdersListResponse>) -> &OrdersQuery {
        let mut page = page.max(1);
        if let Some(last) = last {
            page = page.min(last.total_pages.max(1));
        }
        self.query.page = Some(page);
        &self.query
    }
}
