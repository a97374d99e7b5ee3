//! HTTP surface: routes, handlers and their request/response types.

mod api;
mod error;
mod handlers;
#[allow(clippy::module_inception)]
mod server;

pub use api::{
    AverageQuery, AverageResponse, CustomSplitQuery, EqualSplitQuery, ItemSplitRequest,
    LogsQuery, PairQuery, TipSplitQuery, MAX_LOGS_LIMIT,
};
pub use error::ApiError;
pub use handlers::AppState;
pub use server::ApiServer;
