//! Output artifact kinds

use serde::Serialize;

/// What a tool produces, which determines the artifact's name and type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Merged,
    Split,
    Compressed,
    Word,
    Excel,
    Ppt,
    Organized,
}

impl ArtifactKind {
    /// File name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Split => "split",
            Self::Compressed => "compressed",
            Self::Word => "word",
            Self::Excel => "excel",
            Self::Ppt => "ppt",
            Self::Organized => "organized",
        }
    }

    /// File extension (without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Merged | Self::Compressed | Self::Organized => "pdf",
            Self::Split => "zip",
            Self::Word => "docx",
            Self::Excel => "xlsx",
            Self::Ppt => "pptx",
        }
    }

    /// Generate a fresh, collision-free file name
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.prefix(),
            uuid::Uuid::new_v4().simple(),
            self.extension()
        )
    }
}
