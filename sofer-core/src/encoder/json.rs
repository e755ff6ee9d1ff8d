//! JSON encoder for downstream tooling

use crate::error::RenderError;
use crate::types::Collation;
use std::io::Write;

/// Writes a collation as pretty-printed JSON
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Encoder for JsonEncoder {
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError> {
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, collation)
        } else {
            serde_json::to_writer(&mut *writer, collation)
        };
        result.map_err(|e| RenderError::EncodingFailed(e.to_string()))?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "JSON"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }
}
