//! HTTP handlers bracketing every computation with the audit logger.
//!
//! Each handler records `start` before computing and exactly one of
//! `complete`/`fail` after, so the audit trail captures intent as well as
//! outcome. Validation failures are logged via `fail` and surfaced as 400
//! with the validation message as the body.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::json;

use super::api::{
    AverageQuery, AverageResponse, CustomSplitQuery, EqualSplitQuery, ItemSplitRequest,
    LogsQuery, PairQuery, TipSplitQuery,
};
use super::error::ApiError;
use crate::audit::{AuditLogger, AuditRecord};
use crate::compute;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Audit logger wrapping every operation invocation.
    pub audit: Arc<AuditLogger>,
}

impl AppState {
    /// Create new app state over the given audit logger.
    #[must_use]
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        Self { audit }
    }

    /// Log a validation failure and convert it to the client error response.
    async fn fail(
        &self,
        record: &mut AuditRecord,
        error: crate::compute::ComputeError,
    ) -> ApiError {
        self.audit.fail(record, &error).await;
        error.into()
    }
}

/// GET /api/math/add - Sum of two numbers.
pub async fn math_add(State(state): State<AppState>, Query(q): Query<PairQuery>) -> Json<f64> {
    let request = json!({"a": q.a, "b": q.b});
    let mut record = state.audit.start("add", "/api/math/add", &request).await;

    let result = compute::add(q.a, q.b);
    state.audit.complete(&mut record, &json!(result)).await;
    Json(result)
}

/// GET /api/math/subtract - Difference of two numbers.
pub async fn math_subtract(
    State(state): State<AppState>,
    Query(q): Query<PairQuery>,
) -> Json<f64> {
    let request = json!({"a": q.a, "b": q.b});
    let mut record = state
        .audit
        .start("subtract", "/api/math/subtract", &request)
        .await;

    let result = compute::subtract(q.a, q.b);
    state.audit.complete(&mut record, &json!(result)).await;
    Json(result)
}

/// GET /api/math/multiply - Product of two numbers.
pub async fn math_multiply(
    State(state): State<AppState>,
    Query(q): Query<PairQuery>,
) -> Json<f64> {
    let request = json!({"a": q.a, "b": q.b});
    let mut record = state
        .audit
        .start("multiply", "/api/math/multiply", &request)
        .await;

    let result = compute::multiply(q.a, q.b);
    state.audit.complete(&mut record, &json!(result)).await;
    Json(result)
}

/// GET /api/math/divide - Quotient of two numbers; 400 on a zero divisor.
pub async fn math_divide(
    State(state): State<AppState>,
    Query(q): Query<PairQuery>,
) -> Result<Json<f64>, ApiError> {
    let request = json!({"a": q.a, "b": q.b});
    let mut record = state
        .audit
        .start("divide", "/api/math/divide", &request)
        .await;

    match compute::divide(q.a, q.b) {
        Ok(result) => {
            state.audit.complete(&mut record, &json!(result)).await;
            Ok(Json(result))
        }
        Err(error) => Err(state.fail(&mut record, error).await),
    }
}

/// GET /api/split/equal - Split an amount evenly.
pub async fn split_equal(
    State(state): State<AppState>,
    Query(q): Query<EqualSplitQuery>,
) -> Result<Json<f64>, ApiError> {
    let request = json!({"amount": q.amount, "people": q.people});
    let mut record = state
        .audit
        .start("splitEqually", "/api/split/equal", &request)
        .await;

    match compute::split_equally(q.amount, q.people) {
        Ok(result) => {
            state.audit.complete(&mut record, &json!(result)).await;
            Ok(Json(result))
        }
        Err(error) => Err(state.fail(&mut record, error).await),
    }
}

/// GET /api/split/with-tip - Split a tip-adjusted amount evenly.
pub async fn split_with_tip(
    State(state): State<AppState>,
    Query(q): Query<TipSplitQuery>,
) -> Result<Json<f64>, ApiError> {
    let request = json!({
        "amount": q.amount,
        "people": q.people,
        "tipPercentage": q.tip_percentage,
    });
    let mut record = state
        .audit
        .start("splitWithTip", "/api/split/with-tip", &request)
        .await;

    match compute::split_with_tip(q.amount, q.people, q.tip_percentage) {
        Ok(result) => {
            state.audit.complete(&mut record, &json!(result)).await;
            Ok(Json(result))
        }
        Err(error) => Err(state.fail(&mut record, error).await),
    }
}

/// POST /api/split/custom - Split an amount proportionally to query ratios.
pub async fn split_custom(
    State(state): State<AppState>,
    Query(q): Query<CustomSplitQuery>,
) -> Result<Json<Vec<f64>>, ApiError> {
    let request = json!({"amount": q.amount, "ratios": q.ratios});
    let mut record = state
        .audit
        .start("splitCustom", "/api/split/custom", &request)
        .await;

    let ratios = match q.parse_ratios() {
        Ok(ratios) => ratios,
        Err(message) => {
            state.audit.fail(&mut record, &message).await;
            return Err(ApiError::BadRequest(message));
        }
    };

    match compute::split_custom(q.amount, &ratios) {
        Ok(shares) => {
            state.audit.complete(&mut record, &json!(shares)).await;
            Ok(Json(shares))
        }
        Err(error) => Err(state.fail(&mut record, error).await),
    }
}

/// POST /api/split/byItems - Split an item total evenly among participants.
///
/// A body that cannot be parsed is independently logged and answered with
/// 400 "Invalid JSON format".
pub async fn split_by_items(
    State(state): State<AppState>,
    body: Result<Json<ItemSplitRequest>, JsonRejection>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    let endpoint = "/api/split/byItems";

    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let request = json!({"body": rejection.body_text()});
            let mut record = state.audit.start("splitByItems", endpoint, &request).await;
            state.audit.fail(&mut record, &rejection).await;
            return Err(ApiError::BadRequest("Invalid JSON format".to_string()));
        }
    };

    let request = json!({"items": req.items, "participants": req.participants});
    let mut record = state.audit.start("splitByItems", endpoint, &request).await;

    match compute::split_by_items(&req.items, &req.participants) {
        Ok(shares) => {
            state.audit.complete(&mut record, &json!(shares)).await;
            Ok(Json(shares))
        }
        Err(error) => Err(state.fail(&mut record, error).await),
    }
}

/// GET /api/logs - Audit records, newest first, optionally filtered by
/// operation name and success flag.
pub async fn get_logs(
    State(state): State<AppState>,
    Query(q): Query<LogsQuery>,
) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let limit = q.effective_limit();
    let records = state
        .audit
        .store()
        .query(q.operation, q.successful, limit, q.offset)
        .await?;
    Ok(Json(records))
}

/// GET /api/logs/average - Mean duration of successful calls per operation.
pub async fn get_average(
    State(state): State<AppState>,
    Query(q): Query<AverageQuery>,
) -> Result<Json<AverageResponse>, ApiError> {
    let average_duration_ms = state.audit.average_duration(&q.operation).await?;
    Ok(Json(AverageResponse {
        operation: q.operation,
        average_duration_ms,
    }))
}
