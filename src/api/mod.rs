//! HTTP layer - axum router, shared state and handlers for the upload and download
//! endpoints.
//!
//! | Method | Path                          | Handler              |
//! |--------|-------------------------------|----------------------|
//! | POST   | `/upload`, `/api/v0/prices`   | [`handlers::upload`]   |
//! | GET    | `/download`, `/api/v0/prices` | [`handlers::download`] |

/// Error type rendered as JSON responses
pub mod error;
/// Upload and download handlers
pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::{config::settings::ServerConfig, core::gateway::PriceGateway};

/// Shared data available to all handlers.
/// Holds the persistence gateway and the upload limits; nothing else is shared
/// between requests.
#[derive(Debug)]
pub struct AppState {
    /// Gateway over the injected database connection
    pub gateway: PriceGateway,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
    /// Largest accepted CSV table after decompression, in bytes
    pub max_table_bytes: u64,
}

impl AppState {
    /// Creates the state for a database connection and the configured limits.
    #[must_use]
    pub const fn new(database: DatabaseConnection, server: &ServerConfig) -> Self {
        Self {
            gateway: PriceGateway::new(database),
            max_upload_bytes: server.max_upload_bytes,
            max_table_bytes: server.max_table_bytes,
        }
    }
}

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/download", get(handlers::download))
        .route(
            "/api/v0/prices",
            get(handlers::download).post(handlers::upload),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
