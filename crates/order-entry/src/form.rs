//! Order-entry form state.
//!
//! All changes go through [`OrderFormState::apply`], which returns the next
//! state. Selecting a warehouse clears the district, the customer and the
//! lines in the same transition, so a new warehouse is never paired with a
//! stale downstream selection. Selecting a district clears the customer.

use crate::validation::{validate_order, ValidationResult};
use rust_decimal::Decimal;
use tpcc_types::{
    Customer, DistrictId, Item, NewOrderRequest, OrderLineRequest, StockInfo, WarehouseId,
};

/// One order line being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDraft {
    /// Selected item, once resolved through item search.
    pub item: Option<Item>,
    pub quantity: i32,
    /// Supply warehouse; defaults to the order's warehouse.
    pub supply_w_id: Option<WarehouseId>,
}

impl OrderLineDraft {
    /// A blank line with quantity 1.
    pub fn blank(supply_w_id: Option<WarehouseId>) -> Self {
        Self {
            item: None,
            quantity: 1,
            supply_w_id,
        }
    }

    /// Price times quantity. Zero without an item, a price or a positive
    /// quantity.
    pub fn total(&self) -> Decimal {
        match self.item.as_ref().and_then(|item| item.i_price) {
            Some(price) if self.quantity > 0 => price * Decimal::from(self.quantity),
            _ => Decimal::ZERO,
        }
    }

    /// Whether the supply warehouse is not the order's warehouse.
    pub fn is_remote(&self, home: Option<WarehouseId>) -> bool {
        matches!((self.supply_w_id, home), (Some(supply), Some(home)) if supply != home)
    }
}

/// A change to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    WarehouseSelected(WarehouseId),
    DistrictSelected(DistrictId),
    CustomerSelected(Option<Customer>),
    LineAdded,
    LineRemoved(usize),
    LineItemChanged(usize, Option<Item>),
    LineQuantityChanged(usize, i32),
    LineSupplyWarehouseChanged(usize, WarehouseId),
    /// The order was accepted; start over.
    Submitted,
}

/// State of one order-entry session.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFormState {
    pub warehouse_id: Option<WarehouseId>,
    pub district_id: Option<DistrictId>,
    pub customer: Option<Customer>,
    pub lines: Vec<OrderLineDraft>,
}

impl Default for OrderFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFormState {
    /// An empty form with one blank line.
    pub fn new() -> Self {
        Self {
            warehouse_id: None,
            district_id: None,
            customer: None,
            lines: vec![OrderLineDraft::blank(None)],
        }
    }

    /// Apply one event and return the resulting state.
    pub fn apply(mut self, event: FormEvent) -> Self {
        match event {
            FormEvent::WarehouseSelected(warehouse_id) => {
                return Self {
                    warehouse_id: Some(warehouse_id),
                    district_id: None,
                    customer: None,
                    lines: vec![OrderLineDraft::blank(Some(warehouse_id))],
                };
            }
            FormEvent::DistrictSelected(district_id) => {
                self.district_id = Some(district_id);
                self.customer = None;
            }
            FormEvent::CustomerSelected(customer) => {
                self.customer = customer;
            }
            FormEvent::LineAdded => {
                if self.warehouse_id.is_some() {
                    self.lines.push(OrderLineDraft::blank(self.warehouse_id));
                }
            }
            FormEvent::LineRemoved(index) => {
                if self.lines.len() > 1 && index < self.lines.len() {
                    self.lines.remove(index);
                }
            }
            FormEvent::LineItemChanged(index, item) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.item = item;
                }
            }
            FormEvent::LineQuantityChanged(index, quantity) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = quantity.max(1);
                }
            }
            FormEvent::LineSupplyWarehouseChanged(index, warehouse_id) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.supply_w_id = Some(warehouse_id);
                }
            }
            FormEvent::Submitted => return Self::new(),
        }
        self
    }

    /// Validate the form as it stands.
    pub fn validate(&self) -> ValidationResult {
        validate_order(
            self.warehouse_id,
            self.district_id,
            self.customer.as_ref(),
            Some(&self.lines),
        )
    }

    /// Total of line `index`, or `None` if there is no such line.
    pub fn line_total(&self, index: usize) -> Option<Decimal> {
        self.lines.get(index).map(OrderLineDraft::total)
    }

    /// Sum of all line totals.
    pub fn order_total(&self) -> Decimal {
        self.lines.iter().map(OrderLineDraft::total).sum()
    }

    /// Lines with an item selected.
    pub fn resolved_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.item.is_some()).count()
    }

    /// Build the New-Order request from the resolved lines.
    ///
    /// Returns `None` until warehouse, district and customer are all chosen.
    /// Lines without an item are skipped; lines without a supply warehouse
    /// use the order's warehouse.
    pub fn to_request(&self) -> Option<NewOrderRequest> {
        let warehouse_id = self.warehouse_id?;
        let district_id = self.district_id?;
        let customer = self.customer.as_ref()?;

        let order_lines = self
            .lines
            .iter()
            .filter_map(|line| {
                let item = line.item.as_ref()?;
                Some(OrderLineRequest {
                    item_id: item.i_id,
                    supply_warehouse_id: line.supply_w_id.unwrap_or(warehouse_id),
                    quantity: u16::try_from(line.quantity).unwrap_or(0),
                })
            })
            .collect();

        Some(NewOrderRequest {
            warehouse_id,
            district_id,
            customer_id: customer.c_id,
            order_lines,
        })
    }
}

/// Whether `stock` cannot cover `quantity`.
pub fn is_out_of_stock(quantity: i32, stock: &StockInfo) -> bool {
    stock.is_short_for(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpcc_types::{CustomerId, ItemId};

    fn customer(id: u32) -> Customer {
        Customer {
            c_id: CustomerId(id),
            c_d_id: DistrictId(1),
            c_w_id: WarehouseId(1),
            c_first: "Ann".into(),
            c_middle: "OE".into(),
            c_last: "BARBAR".into(),
            c_phone: None,
            c_credit: None,
            c_credit_lim: None,
            c_discount: None,
            c_balance: None,
        }
    }

    fn item(id: u32, price: Option<Decimal>) -> Item {
        Item {
            i_id: ItemId(id),
            i_im_id: None,
            i_name: Some(format!("item-{id}")),
            i_price: price,
            i_data: None,
        }
    }

    fn filled_form() -> OrderFormState {
        OrderFormState::new()
            .apply(FormEvent::WarehouseSelected(WarehouseId(1)))
            .apply(FormEvent::DistrictSelected(DistrictId(2)))
            .apply(FormEvent::CustomerSelected(Some(customer(7))))
            .apply(FormEvent::LineItemChanged(
                0,
                Some(item(5, Some(Decimal::new(1999, 2)))),
            ))
            .apply(FormEvent::LineQuantityChanged(0, 3))
    }

    #[test]
    fn test_new_form_has_one_blank_line() {
        let form = OrderFormState::new();
        assert_eq!(form.lines, vec![OrderLineDraft::blank(None)]);
        assert!(!form.validate().is_valid);
    }

    #[test]
    fn test_warehouse_change_clears_downstream_atomically() {
        let form = filled_form()
            .apply(FormEvent::LineAdded)
            .apply(FormEvent::WarehouseSelected(WarehouseId(3)));

        assert_eq!(form.warehouse_id, Some(WarehouseId(3)));
        assert_eq!(form.district_id, None);
        assert_eq!(form.customer, None);
        assert_eq!(form.lines, vec![OrderLineDraft::blank(Some(WarehouseId(3)))]);
    }

    #[test]
    fn test_district_change_clears_customer_only() {
        let form = filled_form().apply(FormEvent::DistrictSelected(DistrictId(4)));
        assert_eq!(form.warehouse_id, Some(WarehouseId(1)));
        assert_eq!(form.district_id, Some(DistrictId(4)));
        assert_eq!(form.customer, None);
        assert_eq!(form.resolved_line_count(), 1);
    }

    #[test]
    fn test_lines_need_a_warehouse() {
        let form = OrderFormState::new().apply(FormEvent::LineAdded);
        assert_eq!(form.lines.len(), 1);

        let form = form
            .apply(FormEvent::WarehouseSelected(WarehouseId(2)))
            .apply(FormEvent::LineAdded);
        assert_eq!(form.lines.len(), 2);
        assert_eq!(form.lines[1].supply_w_id, Some(WarehouseId(2)));
    }

    #[test]
    fn test_last_line_cannot_be_removed() {
        let form = filled_form().apply(FormEvent::LineRemoved(0));
        assert_eq!(form.lines.len(), 1);

        let form = form.apply(FormEvent::LineAdded).apply(FormEvent::LineRemoved(0));
        assert_eq!(form.lines.len(), 1);
        assert!(form.lines[0].item.is_none());

        let form = form.apply(FormEvent::LineRemoved(9));
        assert_eq!(form.lines.len(), 1);
    }

    #[test]
    fn test_quantity_is_clamped_to_one() {
        let form = filled_form().apply(FormEvent::LineQuantityChanged(0, -4));
        assert_eq!(form.lines[0].quantity, 1);
    }

    #[test]
    fn test_totals_are_exact() {
        let form = filled_form()
            .apply(FormEvent::LineAdded)
            .apply(FormEvent::LineItemChanged(
                1,
                Some(item(6, Some(Decimal::new(10, 2)))),
            ))
            .apply(FormEvent::LineQuantityChanged(1, 3))
            .apply(FormEvent::LineAdded)
            .apply(FormEvent::LineItemChanged(2, Some(item(8, None))));

        assert_eq!(form.line_total(0), Some(Decimal::new(5997, 2)));
        assert_eq!(form.line_total(1), Some(Decimal::new(30, 2)));
        assert_eq!(form.line_total(2), Some(Decimal::ZERO));
        assert_eq!(form.line_total(3), None);
        assert_eq!(form.order_total(), Decimal::new(6027, 2));
        assert_eq!(form.order_total().to_string(), "60.27");
        assert_eq!(form.resolved_line_count(), 3);
    }

    #[test]
    fn test_to_request_uses_resolved_lines_and_default_supply() {
        let form = filled_form()
            .apply(FormEvent::LineAdded)
            .apply(FormEvent::LineAdded)
            .apply(FormEvent::LineItemChanged(2, Some(item(9, None))))
            .apply(FormEvent::LineSupplyWarehouseChanged(2, WarehouseId(4)));

        let request = form.to_request().unwrap();
        assert_eq!(request.warehouse_id, WarehouseId(1));
        assert_eq!(request.district_id, DistrictId(2));
        assert_eq!(request.customer_id, CustomerId(7));
        assert_eq!(
            request.order_lines,
            vec![
                OrderLineRequest {
                    item_id: ItemId(5),
                    supply_warehouse_id: WarehouseId(1),
                    quantity: 3,
                },
                OrderLineRequest {
                    item_id: ItemId(9),
                    supply_warehouse_id: WarehouseId(4),
                    quantity: 1,
                },
            ]
        );
        assert!(form.lines[2].is_remote(form.warehouse_id));
        assert!(!request.is_all_local());
    }

    #[test]
    fn test_to_request_needs_header_fields() {
        assert!(OrderFormState::new().to_request().is_none());
        let form = filled_form().apply(FormEvent::CustomerSelected(None));
        assert!(form.to_request().is_none());
    }

    #[test]
    fn test_submitted_resets_form() {
        let form = filled_form();
        assert!(form.validate().is_valid);
        assert_eq!(form.apply(FormEvent::Submitted), OrderFormState::new());
    }

    #[test]
    fn test_out_of_stock() {
        let stock = StockInfo {
            s_quantity: 3,
            s_ytd: None,
            s_order_cnt: 0,
            s_remote_cnt: 0,
            s_data: None,
        };
        assert!(is_out_of_stock(4, &stock));
        assert!(!is_out_of_stock(3, &stock));
    }
}
