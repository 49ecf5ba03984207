//! Tool execution endpoint
//!
//! `POST /:tool_id` with a multipart form: `file` or `files`, plus the
//! tool's declared text options. Answers `{ "url": "/download/<name>" }`.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::dispatch;
use crate::error::ToolError;
use crate::state::AppState;
use crate::upload::{read_multipart, UploadBundle};

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolResponse {
    pub url: String,
}

pub async fn run_tool(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let Some(tool) = catalog::lookup(&tool_id) else {
        return state.tool_error(ToolError::UnknownOperation(tool_id));
    };

    // A request without a usable form carries no files
    let bundle = match multipart {
        Ok(multipart) => match read_multipart(multipart, tool).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!("Failed to read form for '{}': {}", tool.id, e);
                return e.into_response();
            }
        },
        Err(rejection) => {
            tracing::debug!("No multipart form for '{}': {}", tool.id, rejection);
            UploadBundle::default()
        }
    };

    match dispatch::run(state.store(), tool, bundle).await {
        Ok(artifact) => Json(ToolResponse {
            url: artifact.download_url(),
        })
        .into_response(),
        Err(e) => state.tool_error(e),
    }
}

/// `POST` on a fixed single-segment path, answered as an unknown tool
pub async fn not_a_tool(State(state): State<AppState>, uri: Uri) -> Response {
    let tool_id = uri.path().trim_start_matches('/').to_string();
    state.tool_error(ToolError::UnknownOperation(tool_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use crate::routes::app;
    use crate::testing::{page_labels, sample_pdf, test_state, zip_entry_names};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use tempfile::TempDir;

    fn server(temp: &TempDir, legacy_status: bool) -> TestServer {
        TestServer::new(app(test_state(temp, legacy_status))).unwrap()
    }

    fn pdf_part(data: Vec<u8>, name: &str) -> Part {
        Part::bytes(data).file_name(name).mime_type("application/pdf")
    }

    #[tokio::test]
    async fn test_merge_round_trip() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form = MultipartForm::new()
            .add_part("files", pdf_part(sample_pdf(&["A"]), "a.pdf"))
            .add_part("files", pdf_part(sample_pdf(&["B"]), "b.pdf"));

        let response = server.post("/merge").multipart(form).await;
        response.assert_status_ok();

        let body: ToolResponse = response.json();
        assert!(body.url.starts_with("/download/merged_"));

        let download = server.get(&body.url).await;
        download.assert_status_ok();
        assert_eq!(page_labels(download.as_bytes()), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_merge_with_one_file() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form = MultipartForm::new().add_part("files", pdf_part(sample_pdf(&["A"]), "a.pdf"));
        let response = server.post("/merge").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Please select at least 2 PDF files to merge");
        assert_eq!(body.code, "insufficient_input");
    }

    #[tokio::test]
    async fn test_merge_with_no_files() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form = MultipartForm::new().add_text("note", "no files here");
        let response = server.post("/merge").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "insufficient_input");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let response = server.post("/split").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "No file uploaded");
        assert_eq!(body.code, "missing_input");
    }

    #[tokio::test]
    async fn test_legacy_status_reports_errors_in_band() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, true);

        let form = MultipartForm::new().add_part("files", pdf_part(sample_pdf(&["A"]), "a.pdf"));
        let response = server.post("/merge").multipart(form).await;

        response.assert_status_ok();
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Please select at least 2 PDF files to merge");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let response = server.post("/rotate").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "Unknown tool");
        assert_eq!(body.code, "unknown_operation");
    }

    #[tokio::test]
    async fn test_post_to_fixed_paths_is_unknown_tool() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        for path in ["/favicon.ico", "/health", "/api/tools"] {
            let response = server.post(path).await;

            response.assert_status(StatusCode::NOT_FOUND);
            let body: ErrorResponse = response.json();
            assert_eq!(body.error, "Unknown tool");
            assert_eq!(body.code, "unknown_operation");
        }
    }

    #[tokio::test]
    async fn test_conversion_failure() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form = MultipartForm::new().add_part("file", pdf_part(b"not a pdf".to_vec(), "x.pdf"));
        let response = server.post("/compress").multipart(form).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "conversion_failure");
        assert!(!body.error.is_empty());

        let leftovers = std::fs::read_dir(temp.path().join("downloads")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_organize_with_order() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form = MultipartForm::new()
            .add_text("order", "3,1,2")
            .add_part("file", pdf_part(sample_pdf(&["A", "B", "C"]), "doc.pdf"));

        let response = server.post("/organize").multipart(form).await;
        response.assert_status_ok();

        let body: ToolResponse = response.json();
        assert!(body.url.starts_with("/download/organized_"));

        let download = server.get(&body.url).await;
        assert_eq!(page_labels(download.as_bytes()), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_split_returns_zip() {
        let temp = TempDir::new().unwrap();
        let server = server(&temp, false);

        let form =
            MultipartForm::new().add_part("file", pdf_part(sample_pdf(&["A", "B"]), "doc.pdf"));
        let response = server.post("/split").multipart(form).await;
        response.assert_status_ok();

        let body: ToolResponse = response.json();
        assert!(body.url.ends_with(".zip"));

        let download = server.get(&body.url).await;
        let mut names = zip_entry_names(download.as_bytes());
        names.sort();
        assert_eq!(names, vec!["page_1.pdf", "page_2.pdf"]);

        // Scratch area is empty again
        assert_eq!(std::fs::read_dir(temp.path().join("uploads")).unwrap().count(), 0);
    }
}
