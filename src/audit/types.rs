//! Audit record types for the request trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted record of one handled request.
///
/// Created when a handler starts via [`AuditRecord::started`], then transitioned
/// exactly once to a completed or failed state. The identifier is assigned by the
/// storage layer on insert and is `None` until then (or forever, if the insert
/// could not be persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Storage-assigned identifier, strictly increasing in insertion order.
    pub id: Option<i64>,
    /// Name of the computation performed (e.g. "add", "splitEqually").
    pub operation: String,
    /// Endpoint path that was called.
    pub endpoint: String,
    /// Serialized request payload.
    pub request: String,
    /// Serialized response payload; empty until completion.
    pub response: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
    /// When the request finished, successfully or not.
    pub response_time: Option<DateTime<Utc>>,
    /// Derived `response_time - request_time` in milliseconds, never negative.
    pub duration_ms: Option<i64>,
    /// Failure description; empty unless the request failed.
    pub error_message: String,
    /// Whether the request completed successfully.
    pub successful: bool,
}

impl AuditRecord {
    /// Create a record for a request that just started, stamped with the
    /// current time. Outcome fields stay at their defaults until the record is
    /// completed or failed.
    #[must_use]
    pub fn started(
        operation: impl Into<String>,
        endpoint: impl Into<String>,
        request: &serde_json::Value,
    ) -> Self {
        Self {
            id: None,
            operation: operation.into(),
            endpoint: endpoint.into(),
            request: request.to_string(),
            response: String::new(),
            request_time: Utc::now(),
            response_time: None,
            duration_ms: None,
            error_message: String::new(),
            successful: false,
        }
    }

    /// Whether the record has reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.response_time.is_some()
    }

    /// Stamp the response time and derive the duration from the two
    /// timestamps, clamping sub-zero clock skew to zero.
    pub(crate) fn stamp_finished(&mut self) {
        let now = Utc::now();
        self.response_time = Some(now);
        self.duration_ms = Some(
            now.signed_duration_since(self.request_time)
                .num_milliseconds()
                .max(0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_defaults() {
        let record = AuditRecord::started(
            "add",
            "/api/math/add",
            &serde_json::json!({"a": 1.0, "b": 2.0}),
        );

        assert!(record.id.is_none());
        assert_eq!(record.operation, "add");
        assert_eq!(record.endpoint, "/api/math/add");
        assert!(record.request.contains("\"a\":1.0"));
        assert!(record.response.is_empty());
        assert!(record.response_time.is_none());
        assert!(record.duration_ms.is_none());
        assert!(record.error_message.is_empty());
        assert!(!record.successful);
        assert!(!record.is_finished());
    }

    #[test]
    fn test_stamp_finished_derives_duration() {
        let mut record = AuditRecord::started("add", "/api/math/add", &serde_json::json!({}));
        record.stamp_finished();

        assert!(record.is_finished());
        let duration = record.duration_ms.unwrap();
        assert!(duration >= 0);

        let response_time = record.response_time.unwrap();
        assert!(response_time >= record.request_time);
    }

    #[test]
    fn test_stamp_finished_clamps_negative_duration() {
        let mut record = AuditRecord::started("add", "/api/math/add", &serde_json::json!({}));
        // Simulate a request time in the future (clock skew).
        record.request_time = Utc::now() + chrono::Duration::seconds(60);
        record.stamp_finished();

        assert_eq!(record.duration_ms, Some(0));
    }

    #[test]
    fn test_record_serialize_round_trip() {
        let record = AuditRecord::started("divide", "/api/math/divide", &serde_json::json!({}));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"operation\":\"divide\""));

        let parsed: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.operation, "divide");
        assert_eq!(parsed.endpoint, "/api/math/divide");
    }
}
