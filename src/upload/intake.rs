//! Multipart intake for tool requests

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};

use crate::catalog::{InputArity, OperationDescriptor};
use crate::error::ToolError;

/// One uploaded file, held only for the duration of the request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// A part without a file name is an unselected file input, even if the
    /// client sent bytes with it
    pub fn is_blank(&self) -> bool {
        self.file_name.as_deref().map_or(true, str::is_empty)
    }
}

/// Text options submitted alongside the files
#[derive(Debug, Clone, Default)]
pub struct ToolOptions(HashMap<String, String>);

impl ToolOptions {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

/// Everything a tool request carried
#[derive(Debug, Clone, Default)]
pub struct UploadBundle {
    /// Files in submission order
    pub files: Vec<UploadedFile>,
    pub options: ToolOptions,
}

/// Read a tool's form fields
///
/// Files are taken from the field selected by the tool's arity. Text
/// fields are kept only if the tool declares them as options; anything
/// else is skipped.
pub async fn read_multipart(
    mut multipart: Multipart,
    tool: &OperationDescriptor,
) -> Result<UploadBundle, MultipartError> {
    let file_field = tool.arity.field_name();
    let mut bundle = UploadBundle::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        if name == file_field {
            if !tool.arity.is_multiple() && !bundle.files.is_empty() {
                tracing::debug!("Ignoring extra '{}' part for '{}'", name, tool.id);
                continue;
            }

            let file_name = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await?;

            tracing::debug!(
                "Received file part: field='{}', filename={:?}, bytes={}",
                name,
                file_name,
                data.len()
            );

            bundle.files.push(UploadedFile { file_name, data });
        } else if tool.accepts_option(&name) {
            let value = field.text().await?;
            bundle.options.insert(name, value);
        } else {
            tracing::debug!("Skipping unexpected field '{}' for '{}'", name, tool.id);
        }
    }

    Ok(bundle)
}

/// Check presence and count of files against the tool's arity
pub fn validate(bundle: &UploadBundle, arity: InputArity) -> Result<(), ToolError> {
    match arity {
        InputArity::Single => match bundle.files.first() {
            Some(file) if !file.is_blank() => Ok(()),
            _ => Err(ToolError::MissingInput),
        },
        InputArity::Multiple { min } => {
            let got = bundle.files.len();
            if got < min {
                Err(ToolError::InsufficientInput { min, got })
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            data: Bytes::from_static(data),
        }
    }

    fn bundle(files: Vec<UploadedFile>) -> UploadBundle {
        UploadBundle {
            files,
            options: ToolOptions::default(),
        }
    }

    #[test]
    fn test_single_requires_a_file() {
        assert!(matches!(
            validate(&bundle(vec![]), InputArity::Single),
            Err(ToolError::MissingInput)
        ));
        assert!(validate(&bundle(vec![file("a.pdf", b"%PDF")]), InputArity::Single).is_ok());
    }

    #[test]
    fn test_blank_part_counts_as_missing() {
        let blank = UploadedFile {
            file_name: Some(String::new()),
            data: Bytes::new(),
        };
        assert!(matches!(
            validate(&bundle(vec![blank]), InputArity::Single),
            Err(ToolError::MissingInput)
        ));
    }

    #[test]
    fn test_nameless_part_with_content_counts_as_missing() {
        for file_name in [None, Some(String::new())] {
            let nameless = UploadedFile {
                file_name,
                data: Bytes::from_static(b"%PDF-1.4"),
            };
            assert!(matches!(
                validate(&bundle(vec![nameless]), InputArity::Single),
                Err(ToolError::MissingInput)
            ));
        }
    }

    #[test]
    fn test_multiple_requires_minimum() {
        let arity = InputArity::Multiple { min: 2 };

        match validate(&bundle(vec![]), arity) {
            Err(ToolError::InsufficientInput { min, got }) => {
                assert_eq!(min, 2);
                assert_eq!(got, 0);
            }
            other => panic!("Expected InsufficientInput, got {:?}", other),
        }

        assert!(matches!(
            validate(&bundle(vec![file("a.pdf", b"%PDF")]), arity),
            Err(ToolError::InsufficientInput { got: 1, .. })
        ));

        assert!(validate(
            &bundle(vec![file("a.pdf", b"%PDF"), file("b.pdf", b"%PDF")]),
            arity
        )
        .is_ok());
    }

    #[test]
    fn test_tool_options() {
        let mut options = ToolOptions::default();
        assert_eq!(options.get("order"), None);
        options.insert("order", "3,1,2");
        assert_eq!(options.get("order"), Some("3,1,2"));
    }
}
