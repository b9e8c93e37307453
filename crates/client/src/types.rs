//! Types for raw API responses.

use std::time::Duration;

/// Result of dispatching a transaction without interpreting its body.
///
/// The load generator needs the status and the raw body so it can apply its
/// own field checks, and the latency so it can record it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text (may be empty).
    pub body: String,
    /// Time from sending the request to reading the full body.
    pub latency: Duration,
}

impl RawResponse {
    /// Check if the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status_code: u16, body: &str) -> RawResponse {
        RawResponse {
            status_code,
            body: body.to_string(),
            latency: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_success_range() {
        assert!(response(200, "").is_success());
        assert!(response(204, "").is_success());
        assert!(!response(199, "").is_success());
        assert!(!response(404, "").is_success());
        assert!(!response(500, "").is_success());
    }

    #[test]
    fn test_json_body() {
        let value = response(200, r#"{"order_id": 1}"#).json().unwrap();
        assert_eq!(value["order_id"], 1);
        assert!(response(200, "<html>").json().is_err());
    }
}
