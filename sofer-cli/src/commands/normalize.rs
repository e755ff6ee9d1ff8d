//! Normalize command implementation

use anyhow::{Context, Result};
use sofer_core::normalize::{MarkClass, Normalizer, SpellingScheme};
use sofer_core::rewrite::normalize_document;
use std::fs;

/// Rewrite a TEI transcription with normalized words
pub fn normalize(
    input: &str,
    output: &str,
    spelling: SpellingScheme,
    strip: &[MarkClass],
) -> Result<()> {
    let xml =
        fs::read_to_string(input).with_context(|| format!("Failed to read input file: {}", input))?;

    let mut normalizer = Normalizer::new().with_strip(strip.iter().copied());
    if let Some(table) = spelling.table() {
        normalizer = normalizer.with_spelling(table);
    }

    let normalized = normalize_document(&xml, &normalizer)
        .with_context(|| format!("Failed to normalize {}", input))?;
    fs::write(output, normalized)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    tracing::info!("Normalized {} -> {} (spelling: {})", input, output, spelling);
    println!("Normalized {} -> {}", input, output);

    Ok(())
}
