//! Office-document-to-PDF conversion
//!
//! Dispatches on extension: word processing formats (docx, txt, rtf),
//! spreadsheets (xlsx, xls, csv) and presentations (pptx). Legacy binary
//! formats (doc, ppt) are rejected up front; their containers predate the
//! zip-based formats and are not worth parsing here.

pub mod sheet;
pub mod slides;
pub mod word;

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};

const WORD_EXTENSIONS: [&str; 3] = ["docx", "txt", "rtf"];
const SHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];
const SLIDE_EXTENSIONS: [&str; 1] = ["pptx"];
const LEGACY_EXTENSIONS: [&str; 2] = ["doc", "ppt"];

#[derive(Debug)]
pub struct OfficeTool;

impl OfficeTool {
    fn convert(&self, input: &InputFile) -> Result<Vec<u8>, PrintHubError> {
        let ext = input.extension().unwrap_or_default();
        match ext.as_str() {
            "docx" => word::docx_to_pdf(&input.bytes),
            "txt" => word::text_to_pdf(&input.bytes, &input.name),
            "rtf" => word::rtf_to_pdf(&input.bytes, &input.name),
            "xlsx" | "xls" => sheet::workbook_to_pdf(&input.bytes, &input.name),
            "csv" => sheet::csv_to_pdf(&input.bytes, &input.name),
            "pptx" => slides::pptx_to_pdf(&input.bytes),
            other => Err(PrintHubError::Unsupported(format!(
                "Cannot convert .{} files",
                other
            ))),
        }
    }
}

impl DocumentTool for OfficeTool {
    fn name(&self) -> &'static str {
        "office-to-pdf"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.is_empty() {
            return Err(PrintHubError::Validation(
                "No documents selected for conversion".into(),
            ));
        }
        for input in inputs {
            let ext = input.extension().unwrap_or_default();
            if LEGACY_EXTENSIONS.contains(&ext.as_str()) {
                return Err(PrintHubError::Unsupported(format!(
                    "{}: legacy .{} format is not supported, re-save as .{}x",
                    input.name, ext, ext
                )));
            }
            let known = WORD_EXTENSIONS.contains(&ext.as_str())
                || SHEET_EXTENSIONS.contains(&ext.as_str())
                || SLIDE_EXTENSIONS.contains(&ext.as_str());
            if !known {
                return Err(PrintHubError::Unsupported(format!(
                    "{} is not a supported office document",
                    input.name
                )));
            }
        }
        Ok(())
    }

    fn run(&self, inputs: &[InputFile]) -> Result<Vec<ToolOutput>, PrintHubError> {
        self.accepts(inputs)?;

        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let bytes = self.convert(input)?;
            tracing::info!(file = %input.name, bytes = bytes.len(), "converted document to PDF");
            outputs.push(ToolOutput {
                name: format!("{}.pdf", input.base_name()),
                bytes,
                mime: PDF_MIME,
            });
        }
        Ok(outputs)
    }
}

/// Truncate a cell or line for rendering, marking the cut.
pub(crate) fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
