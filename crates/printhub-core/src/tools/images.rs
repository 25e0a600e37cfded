//! Image-to-PDF conversion
//!
//! The whole selection becomes one A4 document with one page per image,
//! in selection order: each image is decoded, converted to RGB, and
//! placed inside fixed margins with its aspect ratio preserved.

use crate::error::PrintHubError;
use crate::pdf::DocBuilder;
use crate::tools::{DocumentTool, InputFile, ToolOutput, PDF_MIME};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug)]
pub struct ImageTool;

impl DocumentTool for ImageTool {
    fn name(&self) -> &'static str {
        "image-to-pdf"
    }

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError> {
        if inputs.is_empty() {
            return Err(PrintHubError::Validation(
                "No images selected for conversion".into(),
            ));
        }
        for input in inputs {
            let supported = input
                .extension()
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if !supported {
                return Err(PrintHubError::Unsupported(format!(
                    "{} is not a supported image (png, jpg, jpeg)",
                    input.name
                )));
            }
        }
        Ok(())
    }

    fn run(&self, inputs: &[InputFile]) -> Result<Vec<ToolOutput>, PrintHubError> {
        self.accepts(inputs)?;

        let mut builder = DocBuilder::new();
        for input in inputs {
            let img = image::load_from_memory(&input.bytes)
                .map_err(|e| {
                    PrintHubError::Parse(format!("Failed to decode {}: {}", input.name, e))
                })?
                .to_rgb8();
            builder.image_page(&img)?;
        }
        let bytes = builder.finish()?;
        tracing::info!(images = inputs.len(), bytes = bytes.len(), "converted images to PDF");

        let name = format!(
            "converted-images-{}.pdf",
            chrono::Utc::now().timestamp_millis()
        );
        Ok(vec![ToolOutput {
            name,
            bytes,
            mime: PDF_MIME,
        }])
    }
}
