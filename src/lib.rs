//! Billsplit - arithmetic and bill-splitting HTTP service with a persisted
//! audit trail.

pub mod audit;
pub mod compute;
pub mod config;
pub mod server;
