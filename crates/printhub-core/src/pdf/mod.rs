//! Shared PDF page construction
//!
//! Generated documents (image conversions, office conversions, slide
//! outlines) are assembled here: an A4 page factory plus a flowing text
//! writer that measures content height and breaks pages at the boundary.

use crate::error::PrintHubError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;
use std::mem;

/// A4 portrait in PDF points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// Margin for flowed text content.
pub const TEXT_MARGIN: f64 = 50.0;

/// Margin for full-page image placement: 10 mm per side, matching the
/// converter's fixed margin.
pub const IMAGE_MARGIN: f64 = 28.35;

/// The standard-14 faces generated pages may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    fn base_name(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    fn resource_key(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }
}

#[derive(Default)]
struct PageDraft {
    ops: Vec<Operation>,
    xobjects: Vec<(String, ObjectId)>,
}

/// Incrementally builds a multi-page A4 document.
pub struct DocBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    fonts: [ObjectId; 3],
}

impl DocBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let fonts = [Font::Regular, Font::Bold, Font::Oblique].map(|f| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set("BaseFont", Object::Name(f.base_name().as_bytes().to_vec()));
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            doc.add_object(Object::Dictionary(dict))
        });

        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            fonts,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn font_id(&self, font: Font) -> ObjectId {
        match font {
            Font::Regular => self.fonts[0],
            Font::Bold => self.fonts[1],
            Font::Oblique => self.fonts[2],
        }
    }

    fn push_page(&mut self, draft: PageDraft) -> Result<(), PrintHubError> {
        let content = Content {
            operations: draft.ops,
        };
        let encoded = content
            .encode()
            .map_err(|e| PrintHubError::Transform(format!("Content encoding failed: {}", e)))?;
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), encoded));

        let mut font_dict = Dictionary::new();
        for font in [Font::Regular, Font::Bold, Font::Oblique] {
            font_dict.set(font.resource_key(), Object::Reference(self.font_id(font)));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_dict));
        if !draft.xobjects.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in &draft.xobjects {
                xobjects.set(name.as_str(), Object::Reference(*id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH as f32),
                Object::Real(PAGE_HEIGHT as f32),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));

        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Append one page containing a single image, scaled to fit inside the
    /// fixed margins while preserving aspect ratio and centered both ways.
    pub fn image_page(&mut self, img: &RgbImage) -> Result<(), PrintHubError> {
        let xobject_id = embed_rgb_image(&mut self.doc, img)?;

        let (w, h) = (img.width() as f64, img.height() as f64);
        let img_aspect = w / h;
        let page_aspect = PAGE_WIDTH / PAGE_HEIGHT;

        let (draw_w, draw_h) = if img_aspect > page_aspect {
            let dw = PAGE_WIDTH - 2.0 * IMAGE_MARGIN;
            (dw, dw / img_aspect)
        } else {
            let dh = PAGE_HEIGHT - 2.0 * IMAGE_MARGIN;
            (dh * img_aspect, dh)
        };
        let x = (PAGE_WIDTH - draw_w) / 2.0;
        let y = (PAGE_HEIGHT - draw_h) / 2.0;

        let draft = PageDraft {
            ops: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(draw_w as f32),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(draw_h as f32),
                        Object::Real(x as f32),
                        Object::Real(y as f32),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
            xobjects: vec![("Im0".to_string(), xobject_id)],
        };
        self.push_page(draft)
    }

    /// Assemble the page tree and serialize.
    pub fn finish(mut self) -> Result<Vec<u8>, PrintHubError> {
        let kids = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PrintHubError::Transform(format!("Save failed: {}", e)))?;
        Ok(buffer)
    }
}

impl Default for DocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Flowing text writer over a `DocBuilder`.
///
/// Lines are wrapped to the content width and the cursor tracks rendered
/// height; crossing the bottom margin starts a new page.
pub struct TextFlow {
    builder: DocBuilder,
    draft: PageDraft,
    y: f64,
    image_seq: usize,
}

impl TextFlow {
    pub fn new() -> Self {
        Self {
            builder: DocBuilder::new(),
            draft: PageDraft::default(),
            y: PAGE_HEIGHT - TEXT_MARGIN,
            image_seq: 0,
        }
    }

    fn break_page(&mut self) -> Result<(), PrintHubError> {
        let draft = mem::take(&mut self.draft);
        self.builder.push_page(draft)?;
        self.y = PAGE_HEIGHT - TEXT_MARGIN;
        Ok(())
    }

    fn write_raw_line(
        &mut self,
        text: &str,
        font: Font,
        size: f64,
    ) -> Result<(), PrintHubError> {
        let line_height = size * 1.4;
        if self.y - line_height < TEXT_MARGIN {
            self.break_page()?;
        }
        self.y -= line_height;

        self.draft.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font.resource_key().as_bytes().to_vec()),
                    Object::Real(size as f32),
                ],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Real(TEXT_MARGIN as f32),
                    Object::Real(self.y as f32),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(text),
                    StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    /// Write a paragraph, wrapping to the content width.
    pub fn line(&mut self, text: &str, font: Font, size: f64) -> Result<(), PrintHubError> {
        if text.trim().is_empty() {
            return self.blank(size);
        }
        for chunk in wrap_text(text, max_chars(size)) {
            self.write_raw_line(&chunk, font, size)?;
        }
        Ok(())
    }

    /// Advance the cursor by one empty line.
    pub fn blank(&mut self, size: f64) -> Result<(), PrintHubError> {
        let line_height = size * 1.4;
        if self.y - line_height < TEXT_MARGIN {
            self.break_page()?;
        }
        self.y -= line_height;
        Ok(())
    }

    /// Place an image in the flow, scaled to the content width, moving to a
    /// fresh page when the remaining height cannot hold it.
    pub fn image(&mut self, img: &RgbImage) -> Result<(), PrintHubError> {
        let avail_w = PAGE_WIDTH - 2.0 * TEXT_MARGIN;
        let (w, h) = (img.width() as f64, img.height() as f64);
        let scale = (avail_w / w).min(1.0);
        let mut draw_w = w * scale;
        let mut draw_h = h * scale;

        let max_h = PAGE_HEIGHT - 2.0 * TEXT_MARGIN;
        if draw_h > max_h {
            let shrink = max_h / draw_h;
            draw_w *= shrink;
            draw_h = max_h;
        }

        if self.y - draw_h < TEXT_MARGIN {
            self.break_page()?;
        }
        self.y -= draw_h;

        let xobject_id = embed_rgb_image(&mut self.builder.doc, img)?;
        let name = format!("Im{}", self.image_seq);
        self.image_seq += 1;

        let x = (PAGE_WIDTH - draw_w) / 2.0;
        self.draft.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(draw_w as f32),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(draw_h as f32),
                    Object::Real(x as f32),
                    Object::Real(self.y as f32),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ]);
        self.draft.xobjects.push((name, xobject_id));

        // Gap below the image
        self.y -= 12.0;
        Ok(())
    }

    /// Force a page boundary regardless of remaining height.
    pub fn page_break(&mut self) -> Result<(), PrintHubError> {
        self.break_page()
    }

    pub fn finish(mut self) -> Result<Vec<u8>, PrintHubError> {
        if !self.draft.ops.is_empty() || self.builder.page_ids.is_empty() {
            self.break_page()?;
        }
        self.builder.finish()
    }
}

impl Default for TextFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Embed raw RGB pixels as a flate-compressed image XObject.
fn embed_rgb_image(doc: &mut Document, img: &RgbImage) -> Result<ObjectId, PrintHubError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(img.as_raw())
        .and_then(|_| encoder.finish())
        .map(|data| {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", Object::Integer(img.width() as i64));
            dict.set("Height", Object::Integer(img.height() as i64));
            dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            doc.add_object(Stream::new(dict, data))
        })
        .map_err(|e| PrintHubError::Transform(format!("Image compression failed: {}", e)))
}

/// Encode text for a WinAnsi-encoded standard font. Codepoints outside
/// the encoding become `?` rather than mojibake.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap against an estimated per-line character budget.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(mem::take(&mut current));
        }
        if word.chars().count() > max_chars {
            // Hard-break words longer than a full line
            for chunk in word
                .chars()
                .collect::<Vec<_>>()
                .chunks(max_chars)
                .map(|c| c.iter().collect::<String>())
            {
                if !current.is_empty() {
                    lines.push(mem::take(&mut current));
                }
                current = chunk;
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Estimated character budget for one line at the given font size.
fn max_chars(size: f64) -> usize {
    let avg_glyph = size * 0.55;
    (((PAGE_WIDTH - 2.0 * TEXT_MARGIN) / avg_glyph) as usize).max(1)
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Build a small valid PDF with the given number of pages, each
    /// carrying an identifiable text line.
    pub(crate) fn sample_pdf(num_pages: u32) -> Vec<u8> {
        sample_pdf_labeled(num_pages, "Page")
    }

    pub(crate) fn sample_pdf_labeled(num_pages: u32, prefix: &str) -> Vec<u8> {
        let mut flow = TextFlow::new();
        for i in 1..=num_pages {
            flow.line(&format!("{} {}", prefix, i), Font::Regular, 12.0)
                .unwrap();
            if i < num_pages {
                flow.page_break().unwrap();
            }
        }
        flow.finish().unwrap()
    }
}
