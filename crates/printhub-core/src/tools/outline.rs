//! PDF text extraction
//!
//! Pulls the text layer out of a PDF into a plain-text file. Scanned
//! documents without a text layer yield an empty extraction, which is
//! reported as an error rather than an empty download.

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, TEXT_MIME};

#[derive(Debug)]
pub struct OutlineTool;

impl DocumentTool for OutlineTool {
    fn name(&self) -> &'static str {
        "extract-text"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.is_empty() {
            return Err(PrintHubError::Validation(
                "No files selected for extraction".into(),
            ));
        }
        for input in inputs {
            if input.extension().as_deref() != Some("pdf") {
                return Err(PrintHubError::Validation(format!(
                    "{} is not a PDF file",
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
            let text = pdf_extract::extract_text_from_mem(&input.bytes)
                .map_err(|e| PrintHubError::Parse(format!("Text extraction failed: {}", e)))?;
            if text.trim().is_empty() {
                return Err(PrintHubError::Transform(format!(
                    "{} has no extractable text layer",
                    input.name
                )));
            }
            tracing::info!(file = %input.name, chars = text.len(), "extracted text");
            outputs.push(ToolOutput {
                name: format!("{}.txt", input.base_name()),
                bytes: text.into_bytes(),
                mime: TEXT_MIME,
            });
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::sample_pdf_labeled;

    #[test]
    fn test_rejects_non_pdf() {
        let tool = OutlineTool;
        assert!(matches!(
            tool.accepts(&[InputFile::new("a.txt", vec![1])]),
            Err(PrintHubError::Validation(_))
        ));
    }

    #[test]
    fn test_extracts_generated_text() {
        let tool = OutlineTool;
        let pdf = sample_pdf_labeled(2, "Chapter");
        let outputs = tool.run(&[InputFile::new("book.pdf", pdf)]).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "book.txt");
        assert_eq!(outputs[0].mime, TEXT_MIME);

        let text = String::from_utf8(outputs[0].bytes.clone()).unwrap();
        assert!(text.contains("Chapter 1"));
        assert!(text.contains("Chapter 2"));
    }

    #[test]
    fn test_corrupt_pdf_is_a_parse_error() {
        let tool = OutlineTool;
        let err = tool
            .run(&[InputFile::new("bad.pdf", vec![0, 1, 2])])
            .unwrap_err();
        assert!(matches!(err, PrintHubError::Parse(_)));
    }
}
