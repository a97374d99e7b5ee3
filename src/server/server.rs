//! HTTP server with axum router and graceful shutdown.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_average, get_logs, math_add, math_divide, math_multiply, math_subtract, split_by_items,
    split_custom, split_equal, split_with_tip, AppState,
};
use crate::audit::AuditLogger;
use crate::config::ServerSettings;

/// API server exposing the math and split endpoints plus the audit read
/// surface.
pub struct ApiServer {
    /// Server settings.
    settings: ServerSettings,
    /// Application state shared across handlers.
    state: AppState,
}

impl ApiServer {
    /// Create a new server with default settings.
    #[must_use]
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        Self {
            settings: ServerSettings::default(),
            state: AppState::new(audit),
        }
    }

    /// Set the server settings (builder pattern).
    #[must_use]
    pub fn with_settings(mut self, settings: ServerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.settings.host, self.settings.port)
    }

    /// Build the axum router with all routes and middleware.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/api/math/add", get(math_add))
            .route("/api/math/subtract", get(math_subtract))
            .route("/api/math/multiply", get(math_multiply))
            .route("/api/math/divide", get(math_divide))
            .route("/api/split/equal", get(split_equal))
            .route("/api/split/with-tip", get(split_with_tip))
            .route("/api/split/custom", post(split_custom))
            .route("/api/split/byItems", post(split_by_items))
            .route("/api/logs", get(get_logs))
            .route("/api/logs/average", get(get_average))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.settings.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server runs until the cancellation token is triggered, at which
    /// point it performs a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self, cancel: CancellationToken) -> std::io::Result<()> {
        let addr = self.address();
        let app = self.build_router();

        tracing::info!(address = %addr, "Starting API server");

        let listener = TcpListener::bind(&addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("API server shutting down gracefully");
            })
            .await
    }
}
