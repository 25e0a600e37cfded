//! Presentation format: pptx
//!
//! Slides live in the container as `ppt/slides/slideN.xml`. Text runs are
//! pulled from each slide in numeric order and every slide becomes its
//! own output page.

use crate::error::PrintHubError;
use crate::pdf::{Font, TextFlow};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const TITLE_SIZE: f64 = 16.0;
const BODY_SIZE: f64 = 12.0;

/// Convert a pptx container to PDF, one page per slide.
pub fn pptx_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, PrintHubError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PrintHubError::Parse(format!("Not a valid pptx container: {}", e)))?;

    let mut slide_paths = slide_entries(&archive);
    if slide_paths.is_empty() {
        return Err(PrintHubError::Parse("Presentation has no slides".into()));
    }
    slide_paths.sort_by_key(|(number, _)| *number);

    let mut flow = TextFlow::new();
    let last = slide_paths.len();
    for (i, (number, path)) in slide_paths.into_iter().enumerate() {
        let mut entry = archive
            .by_name(&path)
            .map_err(|_| PrintHubError::Parse(format!("Missing slide entry {}", path)))?;
        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        drop(entry);

        flow.line(&format!("Slide {}", number), Font::Bold, TITLE_SIZE)?;
        flow.blank(BODY_SIZE)?;
        for text in slide_text(&xml)? {
            flow.line(&text, Font::Regular, BODY_SIZE)?;
        }
        if i + 1 < last {
            flow.page_break()?;
        }
    }
    flow.finish()
}

/// (slide number, archive path) for every slide in the container.
fn slide_entries(archive: &ZipArchive<Cursor<&[u8]>>) -> Vec<(u32, String)> {
    archive
        .file_names()
        .filter_map(|name| {
            let digits = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?;
            let number: u32 = digits.parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect()
}

/// Text runs (`a:t` elements) in document order.
fn slide_text(xml: &str) -> Result<Vec<String>, PrintHubError> {
    let mut reader = Reader::from_str(xml);
    let mut runs = Vec::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PrintHubError::Parse(format!("Malformed slide XML: {}", e)))?;
        match event {
            Event::Start(ref e) if e.name().as_ref() == b"a:t" => in_text = true,
            Event::End(ref e) if e.name().as_ref() == b"a:t" => in_text = false,
            Event::Text(t) if in_text => {
                let value = t
                    .unescape()
                    .map_err(|e| PrintHubError::Parse(format!("Bad text node: {}", e)))?;
                if !value.trim().is_empty() {
                    runs.push(value.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(runs)
}
