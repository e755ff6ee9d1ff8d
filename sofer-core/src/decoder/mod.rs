//! Decoders for reading witnesses into the intermediate representation

mod plain;
mod tei;

pub use plain::PlainDecoder;
pub use tei::{reading_types, TeiDecoder};

use crate::error::ParseError;
use crate::types::Witness;
use std::io::Read;

/// Trait for decoding witness formats into the IR
pub trait Decoder: Send + Sync {
    /// Decode a witness from a reader
    fn decode(&self, reader: &mut dyn Read) -> Result<Witness, ParseError>;

    /// File extensions this decoder supports
    fn supported_extensions(&self) -> &[&str];

    /// MIME types this decoder supports
    fn supported_mime_types(&self) -> &[&str];
}

/// Get the appropriate decoder for a file extension
pub fn decoder_for_extension(ext: &str) -> Option<Box<dyn Decoder>> {
    match ext.to_lowercase().as_str() {
        "xml" | "tei" => Some(Box::new(TeiDecoder::new())),
        "txt" => Some(Box::new(PlainDecoder::new())),
        _ => None,
    }
}
