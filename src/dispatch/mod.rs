//! Operation dispatcher
//!
//! Turns a validated upload into one output artifact:
//!
//! 1. inputs are kept in memory or staged to scratch files, as the tool's
//!    descriptor asks
//! 2. an output artifact is reserved in the download area
//! 3. the tool's handler runs on the blocking pool (MuPDF is synchronous
//!    and its documents are not `Send`)
//! 4. the artifact is committed and its reference returned
//!
//! Scratch files and the reserved output are guards, so a failure at any
//! step leaves neither behind.

pub mod handlers;

use std::path::PathBuf;
use std::time::Instant;

use axum::body::Bytes;

use crate::artifacts::{ArtifactStore, StoredArtifact};
use crate::catalog::{InputMode, OperationDescriptor};
use crate::error::{ConvertError, ToolError};
use crate::pdf::PdfSource;
use crate::upload::{validate, ScratchFile, ToolOptions, UploadBundle};

/// Signature every tool handler implements
pub type Handler = fn(&Job) -> Result<(), ConvertError>;

/// One input document as handed to a handler
#[derive(Debug)]
pub enum Input {
    Bytes(Bytes),
    Staged(ScratchFile),
}

impl Input {
    pub fn source(&self) -> PdfSource<'_> {
        match self {
            Self::Bytes(data) => PdfSource::Bytes(data),
            Self::Staged(file) => PdfSource::Path(file.path()),
        }
    }
}

/// Everything a handler needs to produce its output
#[derive(Debug)]
pub struct Job {
    /// Inputs in submission order
    pub inputs: Vec<Input>,
    pub options: ToolOptions,
    /// Where the handler must write its result
    pub output: PathBuf,
    /// For handlers that need extra scratch space
    pub store: ArtifactStore,
}

impl Job {
    /// The first (for single-file tools, the only) input
    pub fn input(&self) -> Result<PdfSource<'_>, ConvertError> {
        self.inputs
            .first()
            .map(Input::source)
            .ok_or_else(|| ConvertError::Empty("No input document".to_string()))
    }
}

/// Run `tool` on `bundle` and return the committed artifact
pub async fn run(
    store: &ArtifactStore,
    tool: &'static OperationDescriptor,
    bundle: UploadBundle,
) -> Result<StoredArtifact, ToolError> {
    validate(&bundle, tool.arity)?;

    let started = Instant::now();
    let file_count = bundle.files.len();
    let total_bytes: usize = bundle.files.iter().map(|f| f.data.len()).sum();

    tracing::info!(
        tool = tool.id,
        files = file_count,
        bytes = total_bytes,
        "Running tool"
    );

    let files = if tool.arity.is_multiple() {
        bundle.files
    } else {
        bundle.files.into_iter().take(1).collect()
    };

    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let input = match tool.input {
            InputMode::Bytes => Input::Bytes(file.data),
            InputMode::ScratchFile => Input::Staged(store.stage_upload(&file.data).await?),
        };
        inputs.push(input);
    }

    let pending = store.reserve(tool.output);
    let job = Job {
        inputs,
        options: bundle.options,
        output: pending.path().to_path_buf(),
        store: store.clone(),
    };

    let handler = tool.handler;
    tokio::task::spawn_blocking(move || handler(&job))
        .await
        .map_err(|e| ToolError::ConversionFailure(format!("Task join error: {}", e)))??;

    let artifact = pending.commit().await?;

    tracing::info!(
        tool = tool.id,
        artifact = %artifact.file_name,
        size = artifact.size,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Tool finished"
    );

    Ok(artifact)
}
