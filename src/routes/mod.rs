//! Route modules for the PDFToolz server

pub mod download;
pub mod health;
pub mod index;
pub mod tools;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the complete application router
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().server.max_upload_bytes;

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index::index))
        // Fixed GET paths would otherwise shadow `/:tool_id` for POSTs
        .route("/health", get(health::health_check).post(tools::not_a_tool))
        .route("/favicon.ico", get(index::favicon).post(tools::not_a_tool))
        .route("/api/tools", get(index::list_tools).post(tools::not_a_tool))
        .route("/download/:filename", get(download::download))
        .route(
            "/:tool_id",
            post(tools::run_tool).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
