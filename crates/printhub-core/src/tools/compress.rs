//! PDF compress tool
//!
//! Re-encodes content streams with Flate and strips document information
//! metadata. Size reduction is reported per file and floored at zero;
//! already-tight inputs can come out marginally larger after a rewrite.

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};
use lopdf::{Document, Object};

/// Info dictionary keys dropped during compression.
const INFO_KEYS: [&[u8]; 6] = [
    b"Title",
    b"Author",
    b"Subject",
    b"Keywords",
    b"Producer",
    b"Creator",
];

/// Outcome of compressing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressionReport {
    /// Percent reduction, floored at zero.
    pub fn reduction_percent(&self) -> u32 {
        if self.compressed_size >= self.original_size || self.original_size == 0 {
            return 0;
        }
        let saved = self.original_size - self.compressed_size;
        ((saved * 100) / self.original_size) as u32
    }
}

#[derive(Debug)]
pub struct CompressTool;

impl DocumentTool for CompressTool {
    fn name(&self) -> &'static str {
        "compress-pdf"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.is_empty() {
            return Err(PrintHubError::Validation(
                "No files selected for compression".into(),
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
            let (bytes, report) = compress_document(&input.bytes)?;
            tracing::info!(
                file = %input.name,
                before = report.original_size,
                after = report.compressed_size,
                reduction = report.reduction_percent(),
                "compressed PDF"
            );
            outputs.push(ToolOutput {
                name: format!("{}_compressed.pdf", input.base_name()),
                bytes,
                mime: PDF_MIME,
            });
        }
        Ok(outputs)
    }
}

/// Compress one document, returning the new bytes and a size report.
pub fn compress_document(bytes: &[u8]) -> Result<(Vec<u8>, CompressionReport), PrintHubError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PrintHubError::Parse(e.to_string()))?;

    strip_info_metadata(&mut doc);
    doc.prune_objects();
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PrintHubError::Transform(format!("Save failed: {}", e)))?;

    let report = CompressionReport {
        original_size: bytes.len(),
        compressed_size: buffer.len(),
    };
    Ok((buffer, report))
}

fn strip_info_metadata(doc: &mut Document) {
    let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => return,
    };
    if let Some(Object::Dictionary(info)) = doc.objects.get_mut(&info_id) {
        for key in INFO_KEYS {
            info.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::sample_pdf;
    use lopdf::{Dictionary, Object};

    fn pdf_with_metadata() -> Vec<u8> {
        let bytes = sample_pdf(2);
        let mut doc = Document::load_mem(&bytes).unwrap();
        let mut info = Dictionary::new();
        info.set("Title", Object::string_literal("Secret Draft"));
        info.set("Author", Object::string_literal("A. Writer"));
        info.set("Producer", Object::string_literal("printhub-test"));
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rejects_non_pdf_and_empty_selection() {
        let tool = CompressTool;
        assert!(tool.accepts(&[]).is_err());
        assert!(tool
            .accepts(&[InputFile::new("a.docx", vec![1])])
            .is_err());
    }

    #[test]
    fn test_metadata_is_stripped() {
        let (bytes, _) = compress_document(&pdf_with_metadata()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        if let Ok(info_id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
            if let Some(Object::Dictionary(info)) = doc.objects.get(&info_id) {
                assert!(info.get(b"Title").is_err());
                assert!(info.get(b"Author").is_err());
                assert!(info.get(b"Producer").is_err());
            }
        }
    }

    #[test]
    fn test_pages_survive_compression() {
        let (bytes, _) = compress_document(&sample_pdf(3)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_reduction_never_negative() {
        let report = CompressionReport {
            original_size: 100,
            compressed_size: 140,
        };
        assert_eq!(report.reduction_percent(), 0);

        let report = CompressionReport {
            original_size: 200,
            compressed_size: 150,
        };
        assert_eq!(report.reduction_percent(), 25);

        let report = CompressionReport {
            original_size: 0,
            compressed_size: 0,
        };
        assert_eq!(report.reduction_percent(), 0);
    }

    #[test]
    fn test_output_naming() {
        let tool = CompressTool;
        let outputs = tool
            .run(&[InputFile::new("scan.pdf", sample_pdf(1))])
            .unwrap();
        assert_eq!(outputs[0].name, "scan_compressed.pdf");
        assert_eq!(outputs[0].mime, PDF_MIME);
    }
}
