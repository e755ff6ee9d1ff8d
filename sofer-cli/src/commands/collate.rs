//! Collate command implementation

use super::{encoder_for, load_transcriptions, load_witness, reading_output, CollateOptions};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sofer_core::collate::Collator;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Collate one transcription against the reference
///
/// A transcription with typed readings is collated once per reading, each to its own file.
pub fn collate(
    reference: &str,
    transcription: &str,
    output: &str,
    format: &str,
    options: &CollateOptions,
) -> Result<()> {
    let config = options.resolve()?;
    let encoder = encoder_for(format, &config)?;

    // Set up progress bar with animation
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading witnesses...");
    let reference = load_witness(Path::new(reference), &config)?;
    let transcriptions = load_transcriptions(Path::new(transcription), &config)?;
    let split = transcriptions.len() > 1;
    let collator = Collator::new(config.normalization()).with_level(config.level);

    let mut summaries = Vec::with_capacity(transcriptions.len());
    for transcription in &transcriptions {
        pb.set_message(format!(
            "Collating {} against {}...",
            transcription.siglum, reference.siglum
        ));
        let collation = collator
            .collate(&reference, transcription)
            .context("Collation failed")?;

        tracing::info!(
            "Collated {} units with {} differences and {} issues",
            collation.units.len(),
            collation.difference_count(),
            collation.issues.len()
        );

        let output_path = if split {
            reading_output(Path::new(output), &transcription.siglum)
        } else {
            PathBuf::from(output)
        };

        pb.set_message(format!("Encoding to {}...", encoder.format_name()));
        let mut output_file = File::create(&output_path).with_context(|| {
            format!("Failed to create output file: {}", output_path.display())
        })?;
        encoder
            .encode(&collation, &mut output_file)
            .with_context(|| format!("Failed to encode to {}", format))?;
        tracing::debug!(
            "Wrote {} as {}",
            output_path.display(),
            encoder.mime_type()
        );

        summaries.push(format!(
            "Collated '{}' against '{}': {} differences, {} issues -> {}",
            collation.transcription,
            collation.reference,
            collation.difference_count(),
            collation.issues.len(),
            output_path.display()
        ));
    }

    pb.finish_with_message(summaries.join("\n"));

    Ok(())
}
