//! Word-processing formats: docx, plain text, rtf
//!
//! docx is unpacked as a zip and `word/document.xml` is streamed with a
//! small state machine: paragraphs keep their heading level, bold/italic
//! emphasis and list markers; tables render one row per line with cells
//! joined by pipes; embedded images are resolved through the relationship
//! map and placed in the flow.

use crate::error::PrintHubError;
use crate::pdf::{Font, TextFlow};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const BODY_SIZE: f64 = 11.0;
const TABLE_SIZE: f64 = 9.0;

/// Convert a docx container to PDF.
pub fn docx_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, PrintHubError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PrintHubError::Parse(format!("Not a valid docx container: {}", e)))?;

    let document_xml = read_entry(&mut archive, "word/document.xml")?;
    let relationships = load_relationships(&mut archive);
    let media = load_media(&mut archive);

    let mut flow = TextFlow::new();
    render_document(&document_xml, &relationships, &media, &mut flow)?;
    flow.finish()
}

/// Convert plain text to PDF, one flowed paragraph per line.
pub fn text_to_pdf(bytes: &[u8], name: &str) -> Result<Vec<u8>, PrintHubError> {
    let text = String::from_utf8_lossy(bytes);
    let mut flow = TextFlow::new();
    flow.line(name, Font::Bold, 14.0)?;
    flow.blank(BODY_SIZE)?;
    for line in text.lines() {
        flow.line(line, Font::Regular, BODY_SIZE)?;
    }
    flow.finish()
}

/// Convert rtf to PDF by stripping control words down to plain text.
pub fn rtf_to_pdf(bytes: &[u8], name: &str) -> Result<Vec<u8>, PrintHubError> {
    let source = String::from_utf8_lossy(bytes);
    let text = strip_rtf(&source);
    if text.trim().is_empty() {
        return Err(PrintHubError::Parse(format!(
            "No readable text found in {}",
            name
        )));
    }
    let mut flow = TextFlow::new();
    for line in text.lines() {
        flow.line(line, Font::Regular, BODY_SIZE)?;
    }
    flow.finish()
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    path: &str,
) -> Result<String, PrintHubError> {
    let mut entry = archive
        .by_name(path)
        .map_err(|_| PrintHubError::Parse(format!("Missing {} in container", path)))?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Relationship id -> archive path, for resolving embedded images.
fn load_relationships(archive: &mut ZipArchive<Cursor<&[u8]>>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let xml = match read_entry(archive, "word/_rels/document.xml.rels") {
        Ok(xml) => xml,
        Err(_) => return map,
    };

    let mut reader = Reader::from_str(&xml);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value().ok().map(|v| v.into_owned()),
                        b"Target" => {
                            target = attr.unescape_value().ok().map(|v| v.into_owned())
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    map.insert(id, format!("word/{}", target));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    map
}

/// Raw bytes of every media entry in the container.
fn load_media(archive: &mut ZipArchive<Cursor<&[u8]>>) -> HashMap<String, Vec<u8>> {
    let mut media = HashMap::new();
    let names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("word/media/"))
        .map(|n| n.to_string())
        .collect();
    for name in names {
        if let Ok(mut entry) = archive.by_name(&name) {
            let mut bytes = Vec::new();
            if entry.read_to_end(&mut bytes).is_ok() {
                media.insert(name, bytes);
            }
        }
    }
    media
}

#[derive(Default)]
struct ParagraphState {
    text: String,
    heading: Option<u8>,
    bold: bool,
    italic: bool,
    list_item: bool,
}

impl ParagraphState {
    fn style(&self) -> (Font, f64) {
        match self.heading {
            Some(1) => (Font::Bold, 18.0),
            Some(2) => (Font::Bold, 15.0),
            Some(_) => (Font::Bold, 13.0),
            None if self.bold => (Font::Bold, BODY_SIZE),
            None if self.italic => (Font::Oblique, BODY_SIZE),
            None => (Font::Regular, BODY_SIZE),
        }
    }
}

fn render_document(
    xml: &str,
    relationships: &HashMap<String, String>,
    media: &HashMap<String, Vec<u8>>,
    flow: &mut TextFlow,
) -> Result<(), PrintHubError> {
    let mut reader = Reader::from_str(xml);

    let mut para = ParagraphState::default();
    let mut in_text = false;
    let mut table_depth = 0u32;
    let mut row_cells: Vec<String> = Vec::new();
    let mut cell_text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PrintHubError::Parse(format!("Malformed document XML: {}", e)))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"w:p" if table_depth == 0 => para = ParagraphState::default(),
                b"w:t" => in_text = true,
                b"w:b" if !flag_disabled(e) => para.bold = true,
                b"w:i" if !flag_disabled(e) => para.italic = true,
                b"w:numPr" => para.list_item = true,
                b"w:pStyle" => {
                    if let Some(level) = heading_level(e) {
                        para.heading = Some(level);
                    }
                }
                b"w:tbl" => table_depth += 1,
                b"w:tr" if table_depth > 0 => row_cells.clear(),
                b"w:tc" if table_depth > 0 => cell_text.clear(),
                b"a:blip" => {
                    if let Some(img) = resolve_image(e, relationships, media) {
                        flow.image(&img)?;
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    let value = t
                        .unescape()
                        .map_err(|e| PrintHubError::Parse(format!("Bad text node: {}", e)))?;
                    if table_depth > 0 {
                        cell_text.push_str(&value);
                    } else {
                        para.text.push_str(&value);
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" if table_depth == 0 => {
                    flush_paragraph(&para, flow)?;
                }
                b"w:tc" if table_depth > 0 => {
                    row_cells.push(cell_text.trim().to_string());
                }
                b"w:tr" if table_depth > 0 => {
                    flow.line(&row_cells.join(" | "), Font::Regular, TABLE_SIZE)?;
                }
                b"w:tbl" => {
                    table_depth = table_depth.saturating_sub(1);
                    if table_depth == 0 {
                        flow.blank(BODY_SIZE)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn flush_paragraph(para: &ParagraphState, flow: &mut TextFlow) -> Result<(), PrintHubError> {
    let (font, size) = para.style();
    if para.text.trim().is_empty() {
        return flow.blank(BODY_SIZE);
    }
    let text = if para.list_item {
        format!("- {}", para.text)
    } else {
        para.text.clone()
    };
    flow.line(&text, font, size)?;
    if para.heading.is_some() {
        flow.blank(BODY_SIZE)?;
    }
    Ok(())
}

/// An emphasis flag counts unless explicitly switched off (w:val="0").
fn flag_disabled(e: &quick_xml::events::BytesStart) -> bool {
    e.attributes().flatten().any(|attr| {
        let value = attr.value.as_ref();
        attr.key.as_ref() == b"w:val" && (value == b"0" || value == b"false" || value == b"none")
    })
}

fn heading_level(e: &quick_xml::events::BytesStart) -> Option<u8> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"w:val" {
            let value = attr.unescape_value().ok()?;
            if let Some(digits) = value.strip_prefix("Heading") {
                return digits.parse().ok();
            }
        }
    }
    None
}

fn resolve_image(
    e: &quick_xml::events::BytesStart,
    relationships: &HashMap<String, String>,
    media: &HashMap<String, Vec<u8>>,
) -> Option<image::RgbImage> {
    let rel_id = e.attributes().flatten().find_map(|attr| {
        (attr.key.as_ref() == b"r:embed")
            .then(|| attr.unescape_value().ok().map(|v| v.into_owned()))
            .flatten()
    })?;
    let path = relationships.get(&rel_id)?;
    let bytes = media.get(path)?;
    match image::load_from_memory(bytes) {
        Ok(img) => Some(img.to_rgb8()),
        Err(error) => {
            tracing::warn!(%rel_id, %error, "skipping undecodable embedded image");
            None
        }
    }
}

/// Flatten rtf markup to plain text. Group braces are dropped, control
/// words are skipped except paragraph and line breaks, and hex escapes
/// are decoded as latin-1.
fn strip_rtf(source: &str) -> String {
    let mut out = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' | '}' | '\r' | '\n' => {}
            '\\' => match chars.peek().copied() {
                Some('\\') | Some('{') | Some('}') => {
                    if let Some(literal) = chars.next() {
                        out.push(literal);
                    }
                }
                Some('\'') => {
                    chars.next();
                    let hex: String = chars.by_ref().take(2).collect();
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        out.push(byte as char);
                    }
                }
                _ => {
                    let mut word = String::new();
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphabetic() {
                            word.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if chars.peek() == Some(&'-') {
                        chars.next();
                    }
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_digit() {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }
                    match word.as_str() {
                        "par" | "line" => out.push('\n'),
                        "tab" => out.push('\t'),
                        _ => {}
                    }
                }
            },
            other => out.push(other),
        }
    }
    out
}
