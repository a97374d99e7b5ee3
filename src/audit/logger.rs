//! Best-effort audit facade: capture-start, capture-outcome, derive duration.
//!
//! Durable writes go through a bounded retry policy; when storage stays down
//! the primary request path continues and a diagnostic is emitted instead.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;

use super::error::AuditError;
use super::store::AuditStore;
use super::types::AuditRecord;

/// Bounded retry policy for durable audit writes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before giving up, including the first.
    pub max_attempts: u32,
    /// Base sleep between attempts; grows linearly with the attempt number.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Default bound on the number of cached per-operation averages.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Records every operation invocation into the [`AuditStore`].
///
/// Logging is best-effort relative to the wrapped operation: a write that
/// fails after the retry budget never surfaces to the caller.
#[derive(Debug)]
pub struct AuditLogger {
    store: AuditStore,
    retry: RetryPolicy,
    cache_capacity: usize,
    // Invalidate-on-write cache of average durations, keyed by operation name.
    averages: Mutex<HashMap<String, f64>>,
}

impl AuditLogger {
    /// Create a logger over the given store with default retry and cache
    /// settings.
    #[must_use]
    pub fn new(store: AuditStore) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            averages: Mutex::new(HashMap::new()),
        }
    }

    /// Set the retry policy (builder pattern).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the average-cache capacity (builder pattern).
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Access the underlying store for read queries.
    #[must_use]
    pub fn store(&self) -> &AuditStore {
        &self.store
    }

    /// Record the start of an operation invocation.
    ///
    /// Stamps the request time and persists the record, returning it with its
    /// storage-assigned identifier. Captures intent, not outcome: it succeeds
    /// from the caller's perspective even when persistence fails, in which
    /// case the returned record carries no identifier and later transitions
    /// are skipped with a diagnostic.
    pub async fn start(
        &self,
        operation: impl Into<String>,
        endpoint: impl Into<String>,
        request: &serde_json::Value,
    ) -> AuditRecord {
        let mut record = AuditRecord::started(operation, endpoint, request);

        let inserted = self
            .with_retry(|| self.store.insert_started(&record))
            .await;
        match inserted {
            Ok(id) => record.id = Some(id),
            Err(error) => {
                tracing::warn!(
                    operation = %record.operation,
                    %error,
                    "Audit start write failed; request proceeds unrecorded"
                );
            }
        }

        record
    }

    /// Record the successful completion of an operation invocation.
    ///
    /// Sets the response payload, stamps the response time, derives the
    /// duration from the record's two timestamps and marks the record
    /// successful. Must be called at most once per record, mutually exclusive
    /// with [`fail`](Self::fail).
    pub async fn complete(&self, record: &mut AuditRecord, response: &serde_json::Value) {
        if record.is_finished() {
            tracing::warn!(
                operation = %record.operation,
                id = ?record.id,
                "Ignoring repeated outcome for an already finished audit record"
            );
            return;
        }

        record.response = response.to_string();
        record.stamp_finished();
        record.successful = true;

        self.persist_outcome(record).await;
        // Invalidate only once the write has landed; doing it earlier lets a
        // concurrent read re-cache the pre-write mean.
        self.invalidate(&record.operation).await;
    }

    /// Record the failure of an operation invocation.
    ///
    /// Sets the error message from the error's description, stamps the
    /// response time, derives the duration and marks the record failed. Must
    /// be called at most once per record, mutually exclusive with
    /// [`complete`](Self::complete).
    pub async fn fail(&self, record: &mut AuditRecord, error: &(dyn std::fmt::Display + Sync)) {
        if record.is_finished() {
            tracing::warn!(
                operation = %record.operation,
                id = ?record.id,
                "Ignoring repeated outcome for an already finished audit record"
            );
            return;
        }

        record.error_message = error.to_string();
        record.stamp_finished();
        record.successful = false;

        self.persist_outcome(record).await;
        self.invalidate(&record.operation).await;
    }

    /// Mean duration in milliseconds of successful invocations of an
    /// operation, or `None` when none have been recorded.
    ///
    /// Served from a bounded cache that outcome writes invalidate per
    /// operation name.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn average_duration(&self, operation: &str) -> Result<Option<f64>, AuditError> {
        if let Some(cached) = self.averages.lock().await.get(operation) {
            return Ok(Some(*cached));
        }

        let average = self.store.average_duration_ms(operation).await?;
        if let Some(value) = average {
            let mut cache = self.averages.lock().await;
            if cache.len() < self.cache_capacity || cache.contains_key(operation) {
                cache.insert(operation.to_string(), value);
            }
        }
        Ok(average)
    }

    async fn persist_outcome(&self, record: &AuditRecord) {
        if let Err(error) = self.write_outcome(record).await {
            tracing::warn!(
                operation = %record.operation,
                id = ?record.id,
                %error,
                "Audit outcome dropped"
            );
        }
    }

    async fn write_outcome(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let id = record.id.ok_or(AuditError::Unpersisted)?;
        // stamp_finished ran just before this.
        let Some(response_time) = record.response_time else {
            return Ok(());
        };
        let duration_ms = record.duration_ms.unwrap_or(0);

        if record.successful {
            self.with_retry(|| {
                self.store
                    .mark_completed(id, record.response.clone(), response_time, duration_ms)
            })
            .await
        } else {
            self.with_retry(|| {
                self.store
                    .mark_failed(id, record.error_message.clone(), response_time, duration_ms)
            })
            .await
        }
    }

    async fn invalidate(&self, operation: &str) {
        self.averages.lock().await.remove(operation);
    }

    async fn with_retry<T, F, Fut>(&self, mut write: F) -> Result<T, AuditError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AuditError>>,
    {
        let mut attempt = 1;
        loop {
            match write().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.retry.max_attempts && error.is_retryable() => {
                    tracing::debug!(attempt, %error, "Audit write failed, retrying");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
