//! Tool catalog
//!
//! Declarative table of every supported operation: identifier, labels shown
//! on the index page, input arity, accepted options, how the input reaches
//! the handler, what kind of artifact comes out and the handler itself.
//! Adding a tool means adding a row here and a handler function.

use serde::Serialize;

use crate::artifacts::ArtifactKind;
use crate::dispatch::{handlers, Handler};

/// How many files a tool accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputArity {
    /// Exactly one file under the `file` field
    Single,
    /// At least `min` files under the `files` field
    Multiple { min: usize },
}

impl InputArity {
    /// Multipart field carrying the upload(s)
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Single => "file",
            Self::Multiple { .. } => "files",
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple { .. })
    }
}

/// Whether the handler gets the upload in memory or as a staged file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Bytes,
    ScratchFile,
}

/// A named text option a tool accepts
#[derive(Debug, Clone, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

/// Catalog entry for one tool
pub struct OperationDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bg: &'static str,
    pub arity: InputArity,
    pub options: &'static [OptionSpec],
    pub input: InputMode,
    pub output: ArtifactKind,
    pub handler: Handler,
}

impl OperationDescriptor {
    /// Whether `name` is one of this tool's declared options
    pub fn accepts_option(&self, name: &str) -> bool {
        self.options.iter().any(|opt| opt.name == name)
    }

    /// Client-facing view of the entry
    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            id: self.id,
            name: self.name,
            desc: self.desc,
            icon: self.icon,
            color: self.color,
            bg: self.bg,
            multiple: self.arity.is_multiple(),
            options: self.options,
        }
    }
}

impl std::fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

/// Serialized form of a catalog entry (index page and `/api/tools`)
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bg: &'static str,
    pub multiple: bool,
    pub options: &'static [OptionSpec],
}

static ORGANIZE_OPTIONS: [OptionSpec; 1] = [OptionSpec {
    name: "order",
    label: "Page order (e.g., 3,1,2,5 or leave empty for all pages):",
    placeholder: "1,2,3...",
}];

static CATALOG: [OperationDescriptor; 7] = [
    OperationDescriptor {
        id: "merge",
        name: "Merge PDF",
        desc: "Combine multiple PDFs into one",
        icon: "ph-files",
        color: "text-red-600",
        bg: "bg-red-100",
        arity: InputArity::Multiple { min: 2 },
        options: &[],
        input: InputMode::Bytes,
        output: ArtifactKind::Merged,
        handler: handlers::merge,
    },
    OperationDescriptor {
        id: "split",
        name: "Split PDF",
        desc: "Extract pages or split into parts",
        icon: "ph-scissors",
        color: "text-purple-600",
        bg: "bg-purple-100",
        arity: InputArity::Single,
        options: &[],
        input: InputMode::ScratchFile,
        output: ArtifactKind::Split,
        handler: handlers::split,
    },
    OperationDescriptor {
        id: "compress",
        name: "Compress PDF",
        desc: "Reduce file size significantly",
        icon: "ph-arrows-in-line-horizontal",
        color: "text-green-600",
        bg: "bg-green-100",
        arity: InputArity::Single,
        options: &[],
        input: InputMode::Bytes,
        output: ArtifactKind::Compressed,
        handler: handlers::compress,
    },
    OperationDescriptor {
        id: "word",
        name: "PDF to Word",
        desc: "Convert to editable .docx",
        icon: "ph-microsoft-word-logo",
        color: "text-blue-600",
        bg: "bg-blue-100",
        arity: InputArity::Single,
        options: &[],
        input: InputMode::ScratchFile,
        output: ArtifactKind::Word,
        handler: handlers::word,
    },
    OperationDescriptor {
        id: "excel",
        name: "PDF to Excel",
        desc: "Extract tables to .xlsx",
        icon: "ph-microsoft-excel-logo",
        color: "text-green-600",
        bg: "bg-green-100",
        arity: InputArity::Single,
        options: &[],
        input: InputMode::ScratchFile,
        output: ArtifactKind::Excel,
        handler: handlers::excel,
    },
    OperationDescriptor {
        id: "ppt",
        name: "PDF to PowerPoint",
        desc: "Convert to .pptx slides",
        icon: "ph-microsoft-powerpoint-logo",
        color: "text-orange-600",
        bg: "bg-orange-100",
        arity: InputArity::Single,
        options: &[],
        input: InputMode::ScratchFile,
        output: ArtifactKind::Ppt,
        handler: handlers::ppt,
    },
    OperationDescriptor {
        id: "organize",
        name: "Organize Pages",
        desc: "Reorder, rotate, delete pages",
        icon: "ph-squares-four",
        color: "text-indigo-600",
        bg: "bg-indigo-100",
        arity: InputArity::Single,
        options: &ORGANIZE_OPTIONS,
        input: InputMode::ScratchFile,
        output: ArtifactKind::Organized,
        handler: handlers::organize,
    },
];

/// Every tool, in display order
pub fn all() -> &'static [OperationDescriptor] {
    &CATALOG
}

/// Find a tool by identifier
pub fn lookup(id: &str) -> Option<&'static OperationDescriptor> {
    CATALOG.iter().find(|tool| tool.id == id)
}
