//! Protection-notice stamping
//!
//! Stamps a "Password Protected Document" notice onto every page as a
//! FreeText annotation. This marks the document, it does not encrypt it;
//! real PDF encryption is a different operation entirely and the output
//! opens in any viewer.

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

pub const MIN_PASSWORD_LEN: usize = 6;

const NOTICE_TEXT: &str = "Password Protected Document";

/// Stamping job with a validated password.
///
/// Construction is the validation point: length and confirmation are
/// checked once, so an existing `StampTool` always holds a usable
/// password.
#[derive(Debug)]
pub struct StampTool {
    password: String,
}

impl StampTool {
    pub fn new(password: &str, confirmation: &str) -> Result<Self, PrintHubError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(PrintHubError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if password != confirmation {
            return Err(PrintHubError::Validation(
                "Passwords do not match".into(),
            ));
        }
        Ok(Self {
            password: password.to_string(),
        })
    }

    /// The password recorded with the stamp.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl DocumentTool for StampTool {
    fn name(&self) -> &'static str {
        "stamp-protected"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.is_empty() {
            return Err(PrintHubError::Validation(
                "No files selected for stamping".into(),
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
            let mut doc = Document::load_mem(&input.bytes)
                .map_err(|e| PrintHubError::Parse(e.to_string()))?;

            let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
            if page_ids.is_empty() {
                return Err(PrintHubError::Parse("PDF has no pages".into()));
            }
            for page_id in page_ids {
                let annot_id = notice_annotation(&mut doc);
                attach_annotation(&mut doc, page_id, annot_id)?;
            }

            let mut bytes = Vec::new();
            doc.save_to(&mut bytes)
                .map_err(|e| PrintHubError::Transform(format!("Save failed: {}", e)))?;

            tracing::info!(file = %input.name, "stamped protection notice");
            outputs.push(ToolOutput {
                name: format!("{}_protected.pdf", input.base_name()),
                bytes,
                mime: PDF_MIME,
            });
        }
        Ok(outputs)
    }
}

fn notice_annotation(doc: &mut Document) -> ObjectId {
    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"FreeText".to_vec()));
    annot.set(
        "Rect",
        Object::Array(vec![
            Object::Real(20.0),
            Object::Real(20.0),
            Object::Real(220.0),
            Object::Real(40.0),
        ]),
    );
    annot.set(
        "Contents",
        Object::String(NOTICE_TEXT.as_bytes().to_vec(), StringFormat::Literal),
    );
    annot.set(
        "DA",
        Object::String(b"/Helv 10 Tf 0.8 0 0 rg".to_vec(), StringFormat::Literal),
    );
    // Print flag so the notice survives on paper
    annot.set("F", Object::Integer(4));
    doc.add_object(Object::Dictionary(annot))
}

fn attach_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), PrintHubError> {
    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| PrintHubError::Transform(e.to_string()))?;

    if let Object::Dictionary(ref mut page_dict) = page {
        if let Ok(Object::Array(ref mut arr)) = page_dict.get_mut(b"Annots") {
            arr.push(Object::Reference(annot_id));
        } else {
            page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::sample_pdf;

    fn annotation_count(bytes: &[u8]) -> usize {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .filter(|&&page_id| {
                let page = doc.get_object(page_id).unwrap();
                matches!(
                    page.as_dict().and_then(|d| d.get(b"Annots")),
                    Ok(Object::Array(_))
                )
            })
            .count()
    }

    #[test]
    fn test_short_password_rejected() {
        let err = StampTool::new("abc", "abc").unwrap_err();
        assert!(matches!(err, PrintHubError::Validation(_)));
    }

    #[test]
    fn test_mismatched_confirmation_rejected() {
        let err = StampTool::new("secret1", "secret2").unwrap_err();
        assert!(err.to_string().contains("match"));
    }

    #[test]
    fn test_every_page_gets_the_notice() {
        let tool = StampTool::new("hunter22", "hunter22").unwrap();
        let outputs = tool
            .run(&[InputFile::new("doc.pdf", sample_pdf(3))])
            .unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "doc_protected.pdf");
        assert_eq!(annotation_count(&outputs[0].bytes), 3);
    }

    #[test]
    fn test_output_is_not_encrypted() {
        let tool = StampTool::new("longenough", "longenough").unwrap();
        let outputs = tool
            .run(&[InputFile::new("doc.pdf", sample_pdf(1))])
            .unwrap();
        // Still loads without any password
        let doc = Document::load_mem(&outputs[0].bytes).unwrap();
        assert!(!doc.is_encrypted());
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_rejects_empty_and_non_pdf_selections() {
        let tool = StampTool::new("abcdef", "abcdef").unwrap();
        assert!(tool.accepts(&[]).is_err());
        assert!(tool
            .accepts(&[InputFile::new("a.png", vec![1])])
            .is_err());
    }

    #[test]
    fn test_stamps_every_file_in_selection() {
        let tool = StampTool::new("abcdef", "abcdef").unwrap();
        let outputs = tool
            .run(&[
                InputFile::new("a.pdf", sample_pdf(1)),
                InputFile::new("b.pdf", sample_pdf(2)),
            ])
            .unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].name, "a_protected.pdf");
        assert_eq!(outputs[1].name, "b_protected.pdf");
        assert_eq!(annotation_count(&outputs[1].bytes), 2);
    }
}
