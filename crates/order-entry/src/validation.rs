//! Client-side order validation.
//!
//! Validation never short-circuits: every problem is reported at once, in a
//! fixed order, so the form can show all of them together.

use crate::form::OrderLineDraft;
use serde::Serialize;
use std::fmt;
use tpcc_types::{Customer, DistrictId, WarehouseId};

/// TPC-C caps a New-Order at 15 lines.
pub const MAX_ORDER_LINES: usize = 15;

/// Largest quantity accepted for one line.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// One problem with the form, tagged with the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field path, e.g. `warehouse` or `orderLines[2].quantity`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Fields with at least one error, in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }
        fields
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_validation_errors(&self.errors))
    }
}

/// Check whether an order can be submitted.
///
/// A zero warehouse or district id counts as not selected. Per-line checks
/// run only when there is at least one line.
pub fn validate_order(
    warehouse_id: Option<WarehouseId>,
    district_id: Option<DistrictId>,
    customer: Option<&Customer>,
    order_lines: Option<&[OrderLineDraft]>,
) -> ValidationResult {
    let mut errors = Vec::new();

    if !warehouse_id.is_some_and(WarehouseId::is_set) {
        errors.push(ValidationError::new("warehouse", "Warehouse is required"));
    }
    if !district_id.is_some_and(DistrictId::is_set) {
        errors.push(ValidationError::new("district", "District is required"));
    }
    if customer.is_none() {
        errors.push(ValidationError::new("customer", "Customer is required"));
    }

    let lines = match order_lines {
        Some(lines) if !lines.is_empty() => lines,
        _ => {
            errors.push(ValidationError::new(
                "orderLines",
                "At least one order line is required",
            ));
            return ValidationResult::from_errors(errors);
        }
    };

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;
        if line.item.is_none() {
            errors.push(ValidationError::new(
                format!("orderLines[{}].item", index),
                format!("Item is required for line {}", number),
            ));
        }
        if line.quantity <= 0 {
            errors.push(ValidationError::new(
                format!("orderLines[{}].quantity", index),
                format!("Quantity must be greater than 0 for line {}", number),
            ));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            errors.push(ValidationError::new(
                format!("orderLines[{}].quantity", index),
                format!("Quantity cannot exceed 99 for line {}", number),
            ));
        }
        if !line.supply_w_id.is_some_and(WarehouseId::is_set) {
            errors.push(ValidationError::new(
                format!("orderLines[{}].supply_w_id", index),
                format!("Supply warehouse is required for line {}", number),
            ));
        }
    }

    if lines.iter().all(|line| line.item.is_none()) {
        errors.push(ValidationError::new(
            "orderLines",
            "At least one order line must have an item selected",
        ));
    }
    if lines.len() > MAX_ORDER_LINES {
        errors.push(ValidationError::new(
            "orderLines",
            "Maximum 15 order lines allowed",
        ));
    }

    ValidationResult::from_errors(errors)
}

/// Join error messages with `"; "`.
pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpcc_types::{CustomerId, Item, ItemId};

    fn customer() -> Customer {
        Customer {
            c_id: CustomerId(7),
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

    fn item(id: u32) -> Item {
        Item {
            i_id: ItemId(id),
            i_im_id: None,
            i_name: None,
            i_price: None,
            i_data: None,
        }
    }

    fn line(item_id: Option<u32>, quantity: i32, supply: Option<u16>) -> OrderLineDraft {
        OrderLineDraft {
            item: item_id.map(item),
            quantity,
            supply_w_id: supply.map(WarehouseId),
        }
    }

    fn fields(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_empty_form_reports_header_fields_in_order() {
        let result = validate_order(None, None, None, Some(&[]));
        assert!(!result.is_valid);
        assert_eq!(
            fields(&result),
            vec!["warehouse", "district", "customer", "orderLines"]
        );
        assert_eq!(
            result.errors[3].message,
            "At least one order line is required"
        );
    }

    #[test]
    fn test_missing_lines_is_same_as_empty() {
        let result = validate_order(None, None, None, None);
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn test_single_valid_line() {
        let customer = customer();
        let lines = [line(Some(5), 1, Some(1))];
        let result = validate_order(
            Some(WarehouseId(1)),
            Some(DistrictId(1)),
            Some(&customer),
            Some(&lines),
        );
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_zero_ids_count_as_missing() {
        let customer = customer();
        let lines = [line(Some(5), 1, Some(0))];
        let result = validate_order(
            Some(WarehouseId(0)),
            Some(DistrictId(0)),
            Some(&customer),
            Some(&lines),
        );
        assert_eq!(
            fields(&result),
            vec!["warehouse", "district", "orderLines[0].supply_w_id"]
        );
    }

    #[test]
    fn test_sixteen_valid_lines_exceed_maximum() {
        let customer = customer();
        let lines: Vec<_> = (1..=16).map(|i| line(Some(i), 1, Some(1))).collect();
        let result = validate_order(
            Some(WarehouseId(1)),
            Some(DistrictId(1)),
            Some(&customer),
            Some(&lines),
        );
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![ValidationError::new(
                "orderLines",
                "Maximum 15 order lines allowed"
            )]
        );
    }

    #[test]
    fn test_quantity_bounds() {
        let customer = customer();
        let lines = [line(Some(1), 100, Some(1)), line(Some(2), 0, Some(1))];
        let result = validate_order(
            Some(WarehouseId(1)),
            Some(DistrictId(1)),
            Some(&customer),
            Some(&lines),
        );
        assert_eq!(
            result.errors,
            vec![
                ValidationError::new(
                    "orderLines[0].quantity",
                    "Quantity cannot exceed 99 for line 1"
                ),
                ValidationError::new(
                    "orderLines[1].quantity",
                    "Quantity must be greater than 0 for line 2"
                ),
            ]
        );
    }

    #[test]
    fn test_lone_unresolved_line_reports_line_and_aggregate() {
        let customer = customer();
        let lines = [line(None, 1, Some(1))];
        let result = validate_order(
            Some(WarehouseId(1)),
            Some(DistrictId(1)),
            Some(&customer),
            Some(&lines),
        );
        assert_eq!(fields(&result), vec!["orderLines[0].item", "orderLines"]);
        assert_eq!(result.errors[0].message, "Item is required for line 1");
        assert_eq!(
            result.errors[1].message,
            "At least one order line must have an item selected"
        );
    }

    #[test]
    fn test_per_line_errors_are_grouped_by_line() {
        let lines = [line(None, 0, None), line(None, 120, Some(1))];
        let result = validate_order(None, None, None, Some(&lines));
        assert_eq!(
            fields(&result),
            vec![
                "warehouse",
                "district",
                "customer",
                "orderLines[0].item",
                "orderLines[0].quantity",
                "orderLines[0].supply_w_id",
                "orderLines[1].item",
                "orderLines[1].quantity",
                "orderLines",
            ]
        );
        assert_eq!(
            result.fields(),
            vec![
                "warehouse",
                "district",
                "customer",
                "orderLines[0].item",
                "orderLines[0].quantity",
                "orderLines[0].supply_w_id",
                "orderLines[1].item",
                "orderLines[1].quantity",
                "orderLines",
            ]
        );
    }

    #[test]
    fn test_format_validation_errors() {
        let result = validate_order(None, Some(DistrictId(2)), None, Some(&[]));
        assert_eq!(
            format_validation_errors(&result.errors),
            "Warehouse is required; Customer is required; At least one order line is required"
        );
        assert_eq!(result.to_string(), format_validation_errors(&result.errors));
        assert_eq!(format_validation_errors(&[]), "");
    }
}
