//! Upload Intake
//!
//! Reads a tool's multipart form into an [`UploadBundle`], checks that the
//! required files are present, and provides the [`ScratchFile`] guard used
//! when a handler needs the upload on disk.

pub mod intake;
pub mod scratch;

pub use intake::{read_multipart, validate, ToolOptions, UploadBundle, UploadedFile};
pub use scratch::ScratchFile;
