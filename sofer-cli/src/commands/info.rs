//! Info command implementation

use super::{is_tei, load_witness, media_type};
use anyhow::{Context, Result};
use serde::Serialize;
use sofer_core::decoder::reading_types;
use sofer_core::types::TokenKind;
use sofer_core::SoferConfig;
use std::path::Path;

/// Witness info output
#[derive(Serialize)]
struct WitnessInfo {
    siglum: String,
    media_type: Option<String>,
    units: usize,
    first_unit: Option<String>,
    last_unit: Option<String>,
    words: usize,
    punctuation: usize,
    breaks: usize,
    boundaries: usize,
    issues: usize,
    reading_types: Vec<String>,
}

/// Display a summary of a witness
pub fn info(input: &str, json: bool) -> Result<()> {
    let input_path = Path::new(input);
    let config = SoferConfig::default();
    let witness = load_witness(input_path, &config)?;

    let reading_types = if is_tei(input_path) {
        let xml = std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read {}", input))?;
        reading_types(&xml)?
    } else {
        Vec::new()
    };

    let count = |wanted: fn(&TokenKind) -> bool| {
        witness
            .units
            .iter()
            .flat_map(|u| &u.tokens)
            .filter(|t| wanted(&t.kind))
            .count()
    };

    let info = WitnessInfo {
        siglum: witness.siglum.clone(),
        media_type: media_type(input_path, &config)?,
        units: witness.units.len(),
        first_unit: witness.units.first().map(|u| u.id.to_string()),
        last_unit: witness.units.last().map(|u| u.id.to_string()),
        words: count(|k| matches!(k, TokenKind::Word)),
        punctuation: count(|k| matches!(k, TokenKind::Punctuation)),
        breaks: count(|k| matches!(k, TokenKind::Break(_))),
        boundaries: count(|k| matches!(k, TokenKind::Boundary(_))),
        issues: witness.issues.len(),
        reading_types,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Siglum:      {}", info.siglum);
        if let Some(media_type) = &info.media_type {
            println!("Format:      {}", media_type);
        }
        println!("Units:       {}", info.units);
        if let (Some(first), Some(last)) = (&info.first_unit, &info.last_unit) {
            println!("Range:       {} - {}", first, last);
        }
        println!("Words:       {}", info.words);
        println!("Punctuation: {}", info.punctuation);
        println!("Breaks:      {}", info.breaks);
        if info.boundaries > 0 {
            println!("Boundaries:  {}", info.boundaries);
        }
        if !info.reading_types.is_empty() {
            println!("Readings:    {}", info.reading_types.join(", "));
        }
        println!("Issues:      {}", info.issues);
    }

    Ok(())
}
