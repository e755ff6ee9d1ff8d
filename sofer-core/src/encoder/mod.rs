//! Encoders for writing a collation as an apparatus

mod context;
mod json;
mod latex;
mod tei;
mod usfm;

pub use context::{ContextConfig, ContextEncoder};
pub use json::JsonEncoder;
pub use latex::LatexEncoder;
pub use tei::TeiEncoder;
pub use usfm::{book_code, UsfmEncoder};

use crate::error::RenderError;
use crate::types::Collation;
use std::io::Write;

/// Trait for encoding collations to output formats
pub trait Encoder: Send + Sync {
    /// Encode a collation to a writer
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError>;

    /// Format name (e.g., "TEI", "ConTeXt")
    fn format_name(&self) -> &str;

    /// File extension for this format
    fn file_extension(&self) -> &str;

    /// MIME type for this format
    fn mime_type(&self) -> &str;
}

/// Get an encoder by format name
pub fn encoder_for_format(format: &str) -> Option<Box<dyn Encoder>> {
    match format.to_lowercase().as_str() {
        "tei" | "xml" => Some(Box::new(TeiEncoder::new())),
        "context" | "tex" => Some(Box::new(ContextEncoder::new())),
        "json" => Some(Box::new(JsonEncoder::new())),
        "latex" => Some(Box::new(LatexEncoder::new())),
        "usfm" | "sfm" => Some(Box::new(UsfmEncoder::new())),
        _ => None,
    }
}
