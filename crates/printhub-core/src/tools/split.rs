//! PDF split tool
//!
//! Explodes one document into N single-page documents, preserving page
//! content and order. Each page is extracted by deleting every other page
//! from a copy and pruning the orphaned objects.

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};
use lopdf::Document;

#[derive(Debug)]
pub struct SplitTool;

impl DocumentTool for SplitTool {
    fn name(&self) -> &'static str {
        "split-pdf"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        match inputs {
            [single] if single.extension().as_deref() == Some("pdf") => Ok(()),
            [single] => Err(PrintHubError::Validation(format!(
                "{} is not a PDF file",
                single.name
            ))),
            _ => Err(PrintHubError::Validation(
                "Split takes exactly one PDF file".into(),
            )),
        }
    }

    fn run(&self, inputs: &[InputFile]) -> Result<Vec<ToolOutput>, PrintHubError> {
        self.accepts(inputs)?;
        let input = &inputs[0];

        let doc = Document::load_mem(&input.bytes)
            .map_err(|e| PrintHubError::Parse(e.to_string()))?;
        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PrintHubError::Parse("PDF has no pages".into()));
        }

        let base = input.base_name().to_string();
        let mut outputs = Vec::with_capacity(page_count as usize);
        for page in 1..=page_count {
            let bytes = extract_page(&doc, page, page_count)?;
            outputs.push(ToolOutput {
                name: format!("{}_page_{}.pdf", base, page),
                bytes,
                mime: PDF_MIME,
            });
        }

        tracing::info!(file = %input.name, pages = page_count, "split PDF");
        Ok(outputs)
    }
}

/// Produce a single-page document containing only `page` (1-indexed).
fn extract_page(doc: &Document, page: u32, page_count: u32) -> Result<Vec<u8>, PrintHubError> {
    let mut single = doc.clone();

    // Delete in reverse so earlier deletions do not shift later indices
    let mut to_delete: Vec<u32> = (1..=page_count).filter(|&p| p != page).collect();
    to_delete.reverse();
    for unwanted in to_delete {
        single.delete_pages(&[unwanted]);
    }

    single.prune_objects();
    single.compress();

    let mut buffer = Vec::new();
    single
        .save_to(&mut buffer)
        .map_err(|e| PrintHubError::Transform(format!("Save failed: {}", e)))?;
    Ok(buffer)
}
