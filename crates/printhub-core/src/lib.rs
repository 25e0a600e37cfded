//! Print-order core: pricing, file configuration, and document tools
//!
//! This crate holds everything that runs without a network: the price
//! model and per-file print configuration store, the document transform
//! tools (merge, split, compress, image and office conversion, text
//! extraction, protection stamping), and the download/handle plumbing
//! their outputs flow through.

pub mod config;
pub mod delivery;
pub mod error;
pub mod pdf;
pub mod pricing;
pub mod tools;

pub use config::{ConfigUpdate, FileConfig, FileConfigStore, PricedConfig};
pub use delivery::{Downloader, HandleRegistry, BATCH_STAGGER};
pub use error::PrintHubError;
pub use pricing::{
    compute_price, order_total, FulfillmentMode, PrintingRates, DELIVERY_FEE, PLATFORM_FEE,
};
pub use tools::{run_batch, BatchOutcome, DocumentTool, InputFile, InputQueue, ToolOutput};

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<u32, PrintHubError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| PrintHubError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Human-readable file size, decimal units.
pub fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let bytes = pdf::testutil::sample_pdf(3);
        assert_eq!(page_count(&bytes).unwrap(), 3);
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        assert!(page_count(b"nope").is_err());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(999), "999 B");
        assert_eq!(format_file_size(1500), "1.5 KB");
        assert_eq!(format_file_size(2_300_000), "2.3 MB");
        assert_eq!(format_file_size(1_000_000_000), "1.0 GB");
    }
}
