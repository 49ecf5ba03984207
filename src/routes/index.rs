//! Catalog page and catalog API

use axum::{extract::State, http::StatusCode, response::Html, Json};

use crate::catalog::ToolSummary;
use crate::html::render_index;
use crate::state::AppState;

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.catalog(), state.config().server.max_upload_bytes))
}

/// `GET /api/tools`
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSummary>> {
    Json(state.catalog().iter().map(|tool| tool.summary()).collect())
}

/// Browsers ask for it on every page load
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
