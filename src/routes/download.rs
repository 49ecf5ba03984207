//! Artifact retrieval

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use tokio_util::io::ReaderStream;

use crate::error::{Result, ToolError};
use crate::state::AppState;

/// `GET /download/:filename`
///
/// The file is streamed from disk. Always answers a missing artifact with
/// 404, whatever the status mode.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let (artifact, file) = state.store().open(&filename).await?;

    let content_type = mime_guess::from_path(&artifact.file_name).first_or_octet_stream();

    tracing::debug!("Serving {} ({} bytes)", artifact.file_name, artifact.size);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, artifact.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                artifact.file_name,
                urlencoding::encode(&artifact.file_name)
            ),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ToolError::ConversionFailure(e.to_string()))
}
