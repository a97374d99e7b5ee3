//! Audit trail: every handled request is recorded with payloads, timing and
//! outcome.

mod error;
mod logger;
mod schema;
mod store;
mod types;

pub use error::AuditError;
pub use logger::{AuditLogger, RetryPolicy, DEFAULT_CACHE_CAPACITY};
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use store::{default_db_path, AuditStore};
pub use types::AuditRecord;
