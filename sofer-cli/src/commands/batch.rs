//! Batch collation command implementation

use super::{
    encoder_for, is_supported, load_transcriptions, load_witness, reading_output, CollateOptions,
};
use anyhow::{bail, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use sofer_core::collate::Collator;
use sofer_core::encoder::Encoder;
use sofer_core::types::Witness;
use sofer_core::SoferConfig;
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Collate every transcription in a directory against one reference
pub fn batch(
    reference: &str,
    input_dir: &str,
    output_dir: &str,
    format: &str,
    jobs: usize,
    options: &CollateOptions,
) -> Result<()> {
    let reference_path = Path::new(reference);
    let input_path = Path::new(input_dir);
    let output_path = Path::new(output_dir);

    let config = options.resolve()?;
    let encoder = encoder_for(format, &config)?;
    let reference = load_witness(reference_path, &config)?;

    // Ensure output directory exists
    fs::create_dir_all(output_path)?;

    // Find all supported files other than the reference
    let reference_canonical = reference_path.canonicalize().ok();
    let files: Vec<_> = fs::read_dir(input_path)
        .with_context(|| format!("Failed to read directory {}", input_dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_supported(p))
        .filter(|p| p.canonicalize().ok() != reference_canonical)
        .collect();

    if files.is_empty() {
        println!("No supported files found in {}", input_dir);
        return Ok(());
    }

    println!("Found {} transcriptions to collate", files.len());

    // Set up progress tracking
    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);
    let issue_count = AtomicUsize::new(0);

    // Configure thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .ok(); // Ignore if already configured

    let collator = Collator::new(config.normalization()).with_level(config.level);

    // Process files in parallel
    files.par_iter().for_each(|file_path| {
        let result = process_file(
            file_path,
            output_path,
            &reference,
            &collator,
            &config,
            &*encoder,
        );

        match result {
            Ok(issues) => {
                success_count.fetch_add(1, Ordering::Relaxed);
                issue_count.fetch_add(issues, Ordering::Relaxed);
            }
            Err(e) => {
                error_count.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Failed to collate {:?}: {:#}", file_path, e);
            }
        }

        overall_pb.inc(1);
    });

    overall_pb.finish();

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);
    let issues = issue_count.load(Ordering::Relaxed);

    println!("\nBatch collation complete:");
    println!("  Success: {}", success);
    println!("  Errors:  {}", errors);
    println!("  Issues:  {}", issues);

    if errors > 0 {
        bail!("Batch collation completed with {} errors", errors);
    }

    Ok(())
}

/// Collate one file, returning the number of unit issues reported
fn process_file(
    input_path: &Path,
    output_dir: &Path,
    reference: &Witness,
    collator: &Collator,
    config: &SoferConfig,
    encoder: &dyn Encoder,
) -> Result<usize> {
    let transcriptions = load_transcriptions(input_path, config)?;

    // Build output path
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Could not determine output filename from input")?;
    let base = output_dir.join(format!("{}.{}", stem, encoder.file_extension()));

    let mut issues = 0;
    for transcription in &transcriptions {
        let collation = collator.collate(reference, transcription)?;
        let output_file = if transcriptions.len() > 1 {
            reading_output(&base, &transcription.siglum)
        } else {
            base.clone()
        };

        let mut output = File::create(&output_file)?;
        encoder.encode(&collation, &mut output)?;

        tracing::info!(
            "Collated {:?} -> {:?} ({} differences)",
            input_path,
            output_file,
            collation.difference_count()
        );
        issues += collation.issues.len();
    }

    Ok(issues)
}
