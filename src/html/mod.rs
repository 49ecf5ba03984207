//! Catalog page
//!
//! The page is a static template with two holes: the tool cards and the
//! catalog as JSON for the upload modal.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::catalog::{OperationDescriptor, ToolSummary};

const TEMPLATE: &str = include_str!("index.html");

/// Render the index page for `tools`
pub fn render_index(tools: &[OperationDescriptor], max_upload_bytes: usize) -> String {
    let mut cards = String::new();
    for tool in tools {
        let _ = write!(
            cards,
            r#"    <div onclick="openTool('{id}')" class="bg-white dark:bg-slate-800 rounded-2xl p-8 shadow-lg hover:shadow-2xl cursor-pointer transition-all border border-gray-200 dark:border-slate-700">
      <div class="w-16 h-16 {bg} rounded-xl flex items-center justify-center mb-6"><i class="ph-fill {icon} text-4xl {color}"></i></div>
      <h3 class="text-xl font-bold mb-2">{name}</h3>
      <p class="text-gray-600 dark:text-gray-400 text-sm">{desc}</p>
    </div>
"#,
            id = encode_double_quoted_attribute(tool.id),
            bg = encode_double_quoted_attribute(tool.bg),
            icon = encode_double_quoted_attribute(tool.icon),
            color = encode_double_quoted_attribute(tool.color),
            name = encode_text(tool.name),
            desc = encode_text(tool.desc),
        );
    }

    let summaries: Vec<ToolSummary> = tools.iter().map(OperationDescriptor::summary).collect();
    let json = serde_json::to_string(&summaries).unwrap_or_else(|_| "[]".to_string());

    TEMPLATE
        .replace("{{TOOL_CARDS}}", &cards)
        .replace("{{TOOLS_JSON}}", &script_safe(&json))
        .replace("{{MAX_UPLOAD_MB}}", &(max_upload_bytes / (1024 * 1024)).to_string())
}

/// Keep embedded JSON from closing the surrounding `<script>` element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
