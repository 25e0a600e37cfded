//! PDF merge tool
//!
//! Concatenates the pages of every queued PDF, in queue order, into one
//! document. Object IDs from each source are offset past the destination's
//! current maximum so references never collide.

use crate::error::PrintHubError;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct MergeTool;

impl DocumentTool for MergeTool {
    fn name(&self) -> &'static str {
        "merge-pdfs"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.len() < 2 {
            return Err(PrintHubError::Validation(
                "At least 2 PDF files are required to merge".into(),
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

        let documents: Vec<&[u8]> = inputs.iter().map(|f| f.bytes.as_slice()).collect();
        let merged = merge_documents(&documents)?;
        tracing::info!(files = inputs.len(), bytes = merged.len(), "merged PDFs");

        let name = format!(
            "merged-pdf-{}.pdf",
            chrono::Utc::now().timestamp_millis()
        );
        Ok(vec![ToolOutput {
            name,
            bytes: merged,
            mime: PDF_MIME,
        }])
    }
}

/// Merge the given PDFs into one document, pages in input order.
pub fn merge_documents(documents: &[&[u8]]) -> Result<Vec<u8>, PrintHubError> {
    if documents.is_empty() {
        return Err(PrintHubError::Validation("No documents to merge".into()));
    }
    if documents.len() == 1 {
        return Ok(documents[0].to_vec());
    }

    let mut loaded = Vec::with_capacity(documents.len());
    for (i, bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            PrintHubError::Parse(format!("Failed to load document {}: {}", i + 1, e))
        })?;
        loaded.push(doc);
    }

    // First document becomes the destination
    let mut dest = loaded.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = page_references(&dest);

    for source in loaded {
        let source_pages = page_references(&source);
        let id_offset = dest_max_id;

        // Shift every source object past the destination's id space
        let mut remapped = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped.insert(new_id, shift_references(object, id_offset));
        }
        for (id, object) in remapped {
            dest.objects.insert(id, object);
        }

        for page_ref in source_pages {
            dest_page_refs.push((page_ref.0 + id_offset, page_ref.1));
        }
        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    rebuild_page_tree(&mut dest, dest_page_refs)?;
    dest.max_id = dest_max_id;
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PrintHubError::Transform(format!("Failed to save merged PDF: {}", e)))?;
    Ok(buffer)
}

fn page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively offset every object reference.
fn shift_references(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| shift_references(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's page tree at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), PrintHubError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PrintHubError::Transform("No document catalog".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| PrintHubError::Transform("Catalog not found".into()))?
        .as_dict()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PrintHubError::Transform("Catalog has no page tree".into()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            let kids = page_refs
                .iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<_>>();
            pages_dict.set("Count", Object::Integer(kids.len() as i64));
            pages_dict.set("Kids", Object::Array(kids));
            Ok(())
        }
        _ => Err(PrintHubError::Transform(
            "Invalid pages dictionary".into(),
        )),
    }
}
