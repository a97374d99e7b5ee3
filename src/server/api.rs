//! Request and response types for the HTTP endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query parameters for the two-operand math endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PairQuery {
    /// First operand (dividend for divide).
    pub a: f64,
    /// Second operand (divisor for divide).
    pub b: f64,
}

/// Query parameters for GET /api/split/equal.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EqualSplitQuery {
    pub amount: f64,
    pub people: i64,
}

/// Query parameters for GET /api/split/with-tip.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TipSplitQuery {
    pub amount: f64,
    pub people: i64,
    #[serde(rename = "tipPercentage")]
    pub tip_percentage: f64,
}

/// Query parameters for POST /api/split/custom.
///
/// Ratios arrive as one comma-separated query value, e.g. `ratios=1,2,3`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomSplitQuery {
    pub amount: f64,
    #[serde(default)]
    pub ratios: String,
}

impl CustomSplitQuery {
    /// Parse the ratio list, reporting the first unparseable entry.
    ///
    /// An empty or all-whitespace value parses to an empty list; emptiness is
    /// validated downstream with its own message.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message naming the offending entry.
    pub fn parse_ratios(&self) -> Result<Vec<f64>, String> {
        self.ratios
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid ratio value: {entry}"))
            })
            .collect()
    }
}

/// JSON body for POST /api/split/byItems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSplitRequest {
    /// Item name to price.
    pub items: BTreeMap<String, f64>,
    /// Participants sharing the total.
    pub participants: Vec<String>,
}

/// Query parameters for GET /api/logs.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsQuery {
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Number of records to skip.
    #[serde(default)]
    pub offset: usize,
    /// Restrict to one operation name.
    #[serde(default)]
    pub operation: Option<String>,
    /// Restrict to successful (or failed) records.
    #[serde(default)]
    pub successful: Option<bool>,
}

impl LogsQuery {
    /// Get the effective limit, capped at [`MAX_LOGS_LIMIT`].
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_LOGS_LIMIT)
    }
}

impl Default for LogsQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            operation: None,
            successful: None,
        }
    }
}

/// Maximum allowed limit for log pagination.
pub const MAX_LOGS_LIMIT: usize = 1000;

const fn default_limit() -> usize {
    100
}

/// Query parameters for GET /api/logs/average.
#[derive(Debug, Clone, Deserialize)]
pub struct AverageQuery {
    /// Operation name to average over.
    pub operation: String,
}

/// Response for GET /api/logs/average.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageResponse {
    /// Operation name the average was computed for.
    pub operation: String,
    /// Mean duration of successful calls; `null` when none exist.
    pub average_duration_ms: Option<f64>,
}
