//! Parameter sampling for each transaction kind.
//!
//! Every function draws uniformly within [`SampleRanges`] from a caller-owned
//! random source, one independent draw per field. Given the same seed they
//! produce the same request.

use rand::Rng;
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use tpcc_types::{
    CustomerId, DeliveryRequest, DistrictId, ItemId, NewOrderRequest, OrderLineRequest,
    OrderStatusQuery, PaymentRequest, StockLevelQuery, TransactionKind, TransactionRequest,
    WarehouseId,
};

// These are fixed by TPC-C scaling rules, not tuning knobs.
pub const DISTRICTS_PER_WAREHOUSE: u16 = 10;
pub const CUSTOMERS_PER_DISTRICT: u32 = 3_000;
pub const ITEMS: u32 = 100_000;

/// Bounds for every sampled field. All ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRanges {
    /// Number of warehouses; ids are drawn from `1..=warehouses`.
    pub warehouses: u16,

    pub districts_per_warehouse: u16,

    pub customers_per_district: u32,

    pub items: u32,

    /// Lines per New-Order request.
    pub order_lines: RangeInclusive<u16>,

    /// Quantity per order line.
    pub quantity: RangeInclusive<u16>,

    /// Payment amount in cents, scaled by 1/100 on the way out.
    pub payment_cents: RangeInclusive<i64>,

    /// Stock-Level threshold.
    pub stock_threshold: RangeInclusive<u16>,
}

impl SampleRanges {
    /// TPC-C ranges for `warehouses` warehouses.
    pub fn new(warehouses: u16) -> Self {
        Self {
            warehouses,
            districts_per_warehouse: DISTRICTS_PER_WAREHOUSE,
            customers_per_district: CUSTOMERS_PER_DISTRICT,
            items: ITEMS,
            order_lines: 5..=15,
            quantity: 1..=10,
            payment_cents: 1..=5_000,
            stock_threshold: 10..=20,
        }
    }

    /// Set the number of warehouses.
    pub fn with_warehouses(mut self, warehouses: u16) -> Self {
        self.warehouses = warehouses;
        self
    }

    /// Every range must be non-empty and start at a positive value.
    pub fn validate(&self) -> Result<(), String> {
        if self.warehouses == 0 {
            return Err("warehouses must be at least 1".into());
        }
        if self.districts_per_warehouse == 0 || self.customers_per_district == 0 || self.items == 0
        {
            return Err("district, customer and item counts must be at least 1".into());
        }
        check("order line", &self.order_lines)?;
        check("quantity", &self.quantity)?;
        check("payment", &self.payment_cents)?;
        check("stock threshold", &self.stock_threshold)?;
        Ok(())
    }
}

fn check<T: PartialOrd + Default>(name: &str, range: &RangeInclusive<T>) -> Result<(), String> {
    if range.is_empty() || *range.start() <= T::default() {
        return Err(format!("{name} range must be non-empty and positive"));
    }
    Ok(())
}

impl Default for SampleRanges {
    fn default() -> Self {
        Self::new(10)
    }
}

pub fn sample_warehouse<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> WarehouseId {
    WarehouseId(rng.gen_range(1..=ranges.warehouses))
}

pub fn sample_district<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> DistrictId {
    DistrictId(rng.gen_range(1..=ranges.districts_per_warehouse))
}

pub fn sample_customer<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> CustomerId {
    CustomerId(rng.gen_range(1..=ranges.customers_per_district))
}

/// Sample a New-Order request. The line count is drawn once, then each line
/// draws its own item and quantity. All lines are supplied by the home
/// warehouse.
pub fn sample_new_order<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> NewOrderRequest {
    let warehouse_id = sample_warehouse(ranges, rng);
    let district_id = sample_district(ranges, rng);
    let customer_id = sample_customer(ranges, rng);
    let line_count = rng.gen_range(ranges.order_lines.clone());

    let mut order_lines = Vec::with_capacity(line_count as usize);
    for _ in 0..line_count {
        order_lines.push(OrderLineRequest {
            item_id: ItemId(rng.gen_range(1..=ranges.items)),
            supply_warehouse_id: warehouse_id,
            quantity: rng.gen_range(ranges.quantity.clone()),
        });
    }

    NewOrderRequest {
        warehouse_id,
        district_id,
        customer_id,
        order_lines,
    }
}

/// Sample a Payment request. The amount is an integer number of cents
/// scaled to exactly two decimal places.
pub fn sample_payment<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> PaymentRequest {
    let warehouse_id = sample_warehouse(ranges, rng);
    let district_id = sample_district(ranges, rng);
    let customer_id = sample_customer(ranges, rng);
    let cents = rng.gen_range(ranges.payment_cents.clone());

    PaymentRequest {
        warehouse_id,
        district_id,
        customer_id,
        amount: Decimal::new(cents, 2),
    }
}

pub fn sample_order_status<R: Rng + ?Sized>(
    ranges: &SampleRanges,
    rng: &mut R,
) -> OrderStatusQuery {
    OrderStatusQuery {
        warehouse_id: sample_warehouse(ranges, rng),
        district_id: sample_district(ranges, rng),
        customer_id: sample_customer(ranges, rng),
    }
}

pub fn sample_delivery<R: Rng + ?Sized>(ranges: &SampleRanges, rng: &mut R) -> DeliveryRequest {
    DeliveryRequest {
        warehouse_id: sample_warehouse(ranges, rng),
        district_id: sample_district(ranges, rng),
    }
}

pub fn sample_stock_level<R: Rng + ?Sized>(
    ranges: &SampleRanges,
    rng: &mut R,
) -> StockLevelQuery {
    StockLevelQuery {
        warehouse_id: sample_warehouse(ranges, rng),
        district_id: sample_district(ranges, rng),
        threshold: rng.gen_range(ranges.stock_threshold.clone()),
    }
}

/// Sample a request of the given kind.
pub fn sample<R: Rng + ?Sized>(
    kind: TransactionKind,
    ranges: &SampleRanges,
    rng: &mut R,
) -> TransactionRequest {
    match kind {
        TransactionKind::NewOrder => TransactionRequest::NewOrder(sample_new_order(ranges, rng)),
        TransactionKind::Payment => TransactionRequest::Payment(sample_payment(ranges, rng)),
        TransactionKind::OrderStatus => {
            TransactionRequest::OrderStatus(sample_order_status(ranges, rng))
        }
        TransactionKind::Delivery => TransactionRequest::Delivery(sample_delivery(ranges, rng)),
        TransactionKind::StockLevel => {
            TransactionRequest::StockLevel(sample_stock_level(ranges, rng))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_same_seed_same_request() {
        let ranges = SampleRanges::default();
        for kind in TransactionKind::ALL {
            let mut a = ChaCha8Rng::seed_from_u64(99);
            let mut b = ChaCha8Rng::seed_from_u64(99);
            assert_eq!(sample(kind, &ranges, &mut a), sample(kind, &ranges, &mut b));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let ranges = SampleRanges::default();
        let mut a = ChaCha8Rng::seed_from_u64(1);
        let mut b = ChaCha8Rng::seed_from_u64(2);
        assert_ne!(
            sample_new_order(&ranges, &mut a),
            sample_new_order(&ranges, &mut b)
        );
    }

    #[test]
    fn test_new_order_ranges() {
        let ranges = SampleRanges::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..2_000 {
            let req = sample_new_order(&ranges, &mut rng);
            assert!((1..=3).contains(&req.warehouse_id.0));
            assert!((1..=10).contains(&req.district_id.0));
            assert!((1..=3_000).contains(&req.customer_id.0));
            assert!((5..=15).contains(&req.order_lines.len()));
            for line in &req.order_lines {
                assert!((1..=10).contains(&line.quantity));
                assert!((1..=100_000).contains(&line.item_id.0));
                assert_eq!(line.supply_warehouse_id, req.warehouse_id);
            }
        }
    }

    #[test]
    fn test_payment_amount_has_two_decimals_in_range() {
        let ranges = SampleRanges::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let min = Decimal::new(1, 2);
        let max = Decimal::new(5_000, 2);

        for _ in 0..5_000 {
            let req = sample_payment(&ranges, &mut rng);
            assert_eq!(req.amount.scale(), 2, "amount {}", req.amount);
            assert!(req.amount >= min && req.amount <= max, "amount {}", req.amount);
            let text = req.amount.to_string();
            assert_eq!(text.split('.').nth(1).map(str::len), Some(2), "{text}");
        }
    }

    #[test]
    fn test_stock_threshold_range() {
        let ranges = SampleRanges::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1_000 {
            let q = sample_stock_level(&ranges, &mut rng);
            assert!((10..=20).contains(&q.threshold));
        }
    }

    #[test]
    fn test_fixed_sequence_gives_range_minimums() {
        // A source that always yields zero maps every uniform draw to the
        // low end of its range.
        let ranges = SampleRanges::default();
        let mut rng = StepRng::new(0, 0);

        let req = sample_new_order(&ranges, &mut rng);
        assert_eq!(req.warehouse_id, WarehouseId(1));
        assert_eq!(req.district_id, DistrictId(1));
        assert_eq!(req.customer_id, CustomerId(1));
        assert_eq!(req.order_lines.len(), 5);
        assert!(req
            .order_lines
            .iter()
            .all(|l| l.item_id == ItemId(1) && l.quantity == 1));

        let pay = sample_payment(&ranges, &mut rng);
        assert_eq!(pay.amount, Decimal::new(1, 2));
        assert_eq!(pay.amount.to_string(), "0.01");
    }

    #[test]
    fn test_sample_matches_kind() {
        let ranges = SampleRanges::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for kind in TransactionKind::ALL {
            assert_eq!(sample(kind, &ranges, &mut rng).kind(), kind);
        }
    }

    #[test]
    fn test_validate() {
        assert!(SampleRanges::default().validate().is_ok());
        assert!(SampleRanges::new(0).validate().is_err());

        let mut ranges = SampleRanges::default();
        ranges.quantity = 0..=10;
        assert!(ranges.validate().is_err());

        let mut ranges = SampleRanges::default();
        ranges.order_lines = RangeInclusive::new(15, 5);
        assert!(ranges.validate().is_err());
    }
}
