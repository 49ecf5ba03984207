//! Artifact storage
//!
//! Two flat directories back the service: a scratch area for staged uploads
//! and a download area for finished conversions. File names are the only
//! index; there is no manifest or database.
//!
//! Output files go through [`PendingArtifact`], which deletes the partial
//! file unless the conversion commits it.

mod kind;
mod store;

pub use kind::ArtifactKind;
pub use store::{is_safe_file_name, ArtifactStore, PendingArtifact, StoredArtifact};
