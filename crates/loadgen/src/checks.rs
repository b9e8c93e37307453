//! Outcome classification for dispatched transactions.
//!
//! A transaction succeeds on any 2xx status. With field checks enabled the
//! body must also be a JSON object carrying the kind's required fields. A
//! field is present when its key exists, even if the value is `null`; fields
//! that hold lists must be arrays.

use serde_json::Value;
use std::fmt;
use tpcc_client::{ApiError, RawResponse};
use tpcc_types::TransactionKind;

/// One field a successful response must carry. Dotted paths descend into
/// nested objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    pub path: &'static str,
    pub is_list: bool,
}

const fn field(path: &'static str) -> RequiredField {
    RequiredField {
        path,
        is_list: false,
    }
}

const fn list(path: &'static str) -> RequiredField {
    RequiredField {
        path,
        is_list: true,
    }
}

const NEW_ORDER_FIELDS: &[RequiredField] = &[
    field("order_id"),
    field("customer"),
    field("total_amount"),
    list("order_lines"),
];
const PAYMENT_FIELDS: &[RequiredField] = &[field("payment_amount"), field("customer.c_id")];
const ORDER_STATUS_FIELDS: &[RequiredField] = &[
    field("customer"),
    field("latest_order"),
    list("order_lines"),
];
const DELIVERY_FIELDS: &[RequiredField] =
    &[field("delivery_date"), field("total_orders_delivered")];
const STOCK_LEVEL_FIELDS: &[RequiredField] = &[field("low_stock_count")];

/// Fields checked on a successful response of the given kind.
pub fn required_fields(kind: TransactionKind) -> &'static [RequiredField] {
    match kind {
        TransactionKind::NewOrder => NEW_ORDER_FIELDS,
        TransactionKind::Payment => PAYMENT_FIELDS,
        TransactionKind::OrderStatus => ORDER_STATUS_FIELDS,
        TransactionKind::Delivery => DELIVERY_FIELDS,
        TransactionKind::StockLevel => STOCK_LEVEL_FIELDS,
    }
}

/// Why an iteration failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The API answered with a non-2xx status.
    Status(u16),
    /// Connection or protocol failure.
    Transport(String),
    /// The client timeout elapsed.
    Timeout,
    /// The run was cancelled while the request was in flight.
    Abandoned,
    /// A 2xx body that is not a JSON object.
    MalformedBody(String),
    /// A 2xx body missing a required field.
    MissingField(&'static str),
}

impl FailureReason {
    /// Coarse class used to group failures in reports.
    pub fn class(&self) -> FailureClass {
        match self {
            FailureReason::Status(_) => FailureClass::Status,
            FailureReason::Transport(_) | FailureReason::Timeout => FailureClass::Transport,
            FailureReason::Abandoned => FailureClass::Abandoned,
            FailureReason::MalformedBody(_) | FailureReason::MissingField(_) => {
                FailureClass::Body
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::Abandoned => write!(f, "abandoned at shutdown"),
            FailureReason::MalformedBody(msg) => write!(f, "malformed body: {}", msg),
            FailureReason::MissingField(path) => write!(f, "missing field {}", path),
        }
    }
}

/// Report grouping for [`FailureReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Status,
    Transport,
    Abandoned,
    Body,
}

impl FailureClass {
    pub const COUNT: usize = 4;

    pub const ALL: [FailureClass; Self::COUNT] = [
        FailureClass::Status,
        FailureClass::Transport,
        FailureClass::Abandoned,
        FailureClass::Body,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FailureClass::Status => "status",
            FailureClass::Transport => "transport",
            FailureClass::Abandoned => "abandoned",
            FailureClass::Body => "body",
        }
    }
}

/// Result of one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

/// Classify the result of dispatching a transaction of `kind`.
pub fn classify(
    kind: TransactionKind,
    result: &Result<RawResponse, ApiError>,
    check_fields: bool,
) -> Outcome {
    let response = match result {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return Outcome::Failure(FailureReason::Timeout),
        Err(e) => return Outcome::Failure(FailureReason::Transport(e.to_string())),
    };

    if !response.is_success() {
        return Outcome::Failure(FailureReason::Status(response.status_code));
    }
    if !check_fields {
        return Outcome::Success;
    }

    match check_body(kind, &response.body) {
        Ok(()) => Outcome::Success,
        Err(reason) => Outcome::Failure(reason),
    }
}

/// Check a 2xx body for the kind's required fields.
pub fn check_body(kind: TransactionKind, body: &str) -> Result<(), FailureReason> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FailureReason::MalformedBody(e.to_string()))?;
    if !value.is_object() {
        return Err(FailureReason::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    }

    for required in required_fields(kind) {
        match lookup(&value, required.path) {
            Some(found) if !required.is_list || found.is_array() => {}
            _ => return Err(FailureReason::MissingField(required.path)),
        }
    }
    Ok(())
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ok(status_code: u16, body: &str) -> Result<RawResponse, ApiError> {
        Ok(RawResponse {
            status_code,
            body: body.to_string(),
            latency: Duration::from_millis(1),
        })
    }

    #[test]
    fn test_non_2xx_is_failure_regardless_of_checks() {
        for check in [false, true] {
            let outcome = classify(TransactionKind::NewOrder, &ok(500, "{}"), check);
            assert_eq!(outcome, Outcome::Failure(FailureReason::Status(500)));
        }
    }

    #[test]
    fn test_any_2xx_succeeds_without_checks() {
        let outcome = classify(TransactionKind::Delivery, &ok(201, "not json"), false);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_missing_field_fails_only_with_checks() {
        let body = r#"{"payment_amount": "10.00", "customer": {"c_last": "BAR"}}"#;
        assert!(classify(TransactionKind::Payment, &ok(200, body), false).is_success());
        assert_eq!(
            classify(TransactionKind::Payment, &ok(200, body), true),
            Outcome::Failure(FailureReason::MissingField("customer.c_id"))
        );
    }

    #[test]
    fn test_payment_with_all_fields_passes() {
        let body = r#"{"payment_amount": "10.00", "customer": {"c_id": 5}}"#;
        assert_eq!(check_body(TransactionKind::Payment, body), Ok(()));
    }

    #[test]
    fn test_null_counts_as_present() {
        let body = r#"{"delivery_date": "2024-01-01T00:00:00", "total_orders_delivered": null}"#;
        assert_eq!(check_body(TransactionKind::Delivery, body), Ok(()));
    }

    #[test]
    fn test_list_fields_must_be_arrays() {
        let body = r#"{"customer": {}, "latest_order": null, "order_lines": {}}"#;
        assert_eq!(
            check_body(TransactionKind::OrderStatus, body),
            Err(FailureReason::MissingField("order_lines"))
        );

        let body = r#"{"customer": {}, "latest_order": null, "order_lines": []}"#;
        assert_eq!(check_body(TransactionKind::OrderStatus, body), Ok(()));
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            check_body(TransactionKind::StockLevel, "<html>"),
            Err(FailureReason::MalformedBody(_))
        ));
        assert!(matches!(
            check_body(TransactionKind::StockLevel, "[1, 2]"),
            Err(FailureReason::MalformedBody(_))
        ));
    }

    #[test]
    fn test_stock_level_requires_low_stock_count() {
        assert_eq!(
            check_body(TransactionKind::StockLevel, r#"{"low_stock_count": 0}"#),
            Ok(())
        );
        assert_eq!(
            check_body(TransactionKind::StockLevel, r#"{"threshold": 12}"#),
            Err(FailureReason::MissingField("low_stock_count"))
        );
    }

    #[test]
    fn test_failure_classes() {
        assert_eq!(FailureReason::Status(404).class(), FailureClass::Status);
        assert_eq!(FailureReason::Timeout.class(), FailureClass::Transport);
        assert_eq!(
            FailureReason::MissingField("order_id").class(),
            FailureClass::Body
        );
        assert_eq!(FailureReason::Abandoned.class(), FailureClass::Abandoned);
    }
}
