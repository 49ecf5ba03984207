//! Error types for the PDFToolz server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, ToolError>;

/// Failure taxonomy visible to clients
#[derive(Error, Debug)]
pub enum ToolError {
    /// No file attached where one was required
    #[error("No file uploaded")]
    MissingInput,

    /// Fewer files than the tool needs
    #[error("Please select at least {min} PDF files to merge")]
    InsufficientInput { min: usize, got: usize },

    /// Anything that went wrong inside a collaborator or on disk
    #[error("{0}")]
    ConversionFailure(String),

    /// Requested artifact is not in the download area
    #[error("File not found")]
    NotFound,

    /// Tool identifier not in the catalog
    #[error("Unknown tool")]
    UnknownOperation(String),
}

impl ToolError {
    /// Stable machine-readable discriminant
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::InsufficientInput { .. } => "insufficient_input",
            Self::ConversionFailure(_) => "conversion_failure",
            Self::NotFound => "not_found",
            Self::UnknownOperation(_) => "unknown_operation",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput | Self::InsufficientInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UnknownOperation(_) => StatusCode::NOT_FOUND,
            Self::ConversionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render with an explicit status, used for in-band (HTTP 200) signalling
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        match &self {
            Self::ConversionFailure(msg) => tracing::error!("Conversion failed: {}", msg),
            Self::UnknownOperation(id) => tracing::warn!("Unknown tool requested: '{}'", id),
            other => tracing::debug!("Request rejected: {}", other),
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.into_response_with_status(status)
    }
}

/// Failures raised by the document collaborators
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("MuPDF error: {0}")]
    MuPdf(String),

    #[error("{0}")]
    Office(#[from] crate::office::OfficeError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Empty(String),
}

impl From<mupdf::Error> for ConvertError {
    fn from(err: mupdf::Error) -> Self {
        ConvertError::MuPdf(err.to_string())
    }
}

impl From<ConvertError> for ToolError {
    fn from(err: ConvertError) -> Self {
        ToolError::ConversionFailure(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::ConversionFailure(err.to_string())
    }
}
