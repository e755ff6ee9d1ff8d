//! CLI command implementations

mod batch;
mod check;
mod collate;
mod fields;
mod info;
mod normalize;

pub use batch::batch;
pub use check::check;
pub use collate::collate;
pub use fields::fields;
pub use info::info;
pub use normalize::normalize;

use anyhow::{Context, Result};
use clap::Args;
use sofer_core::decoder::{decoder_for_extension, reading_types, Decoder, PlainDecoder};
use sofer_core::encoder::{
    encoder_for_format, ContextEncoder, Encoder, LatexEncoder, UsfmEncoder,
};
use sofer_core::normalize::{MarkClass, SpellingScheme};
use sofer_core::types::{DivisionLevel, Witness};
use sofer_core::SoferConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Options shared by `collate` and `batch`; flags override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct CollateOptions {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Mark classes to strip from displayed text (cantillation, pointing, extraordinaire)
    #[arg(short = 'a', long = "strip", value_delimiter = ',')]
    pub strip: Vec<MarkClass>,

    /// TEI elements to skip with their content
    #[arg(short = 't', long = "ignore-tag", value_delimiter = ',')]
    pub ignored_tags: Vec<String>,

    /// Division level to collate at (book, chapter, verse)
    #[arg(short, long)]
    pub level: Option<DivisionLevel>,

    /// Reading type to prefer inside <app> (e.g. qere)
    #[arg(long)]
    pub reading_type: Option<String>,

    /// Spelling table to apply (none, sro, sro-chronicles)
    #[arg(long)]
    pub spelling: Option<SpellingScheme>,

    /// Leave punctuation out of the collation
    #[arg(long)]
    pub ignore_punctuation: bool,

    /// Leave section breaks out of the collation
    #[arg(long)]
    pub ignore_breaks: bool,
}

impl CollateOptions {
    /// Load the config file, if any, and apply the command-line overrides
    pub fn resolve(&self) -> Result<SoferConfig> {
        let mut config = match &self.config {
            Some(path) => SoferConfig::from_path(path)
                .with_context(|| format!("Failed to load configuration {}", path))?,
            None => SoferConfig::default(),
        };

        if !self.strip.is_empty() {
            config.display_strip = self.strip.clone();
        }
        config.ignored_tags.extend(self.ignored_tags.iter().cloned());
        if let Some(level) = self.level {
            config.level = level;
        }
        if self.reading_type.is_some() {
            config.reading_type = self.reading_type.clone();
        }
        if let Some(spelling) = self.spelling {
            config.spelling = spelling;
        }
        config.ignore_punctuation |= self.ignore_punctuation;
        config.ignore_breaks |= self.ignore_breaks;

        config.validate()?;
        Ok(config)
    }
}

/// Whether a file has an extension some decoder reads
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| decoder_for_extension(ext).is_some())
        .unwrap_or(false)
}

fn is_tei(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref(),
        Some("xml") | Some("tei")
    )
}

/// Decoder for a file, set up from the configuration
fn decoder_for(path: &Path, config: &SoferConfig) -> Result<Box<dyn Decoder>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .context("Could not determine input file extension")?;

    let decoder: Box<dyn Decoder> = match ext.to_lowercase().as_str() {
        "xml" | "tei" => Box::new(config.tei_decoder()),
        "txt" => {
            let mut decoder = PlainDecoder::new()
                .with_ignore_punctuation(config.ignore_punctuation)
                .with_ignore_breaks(config.ignore_breaks);
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                decoder = decoder.with_siglum(stem);
            }
            Box::new(decoder)
        }
        _ => decoder_for_extension(ext)
            .with_context(|| format!("No decoder available for .{} files", ext))?,
    };
    Ok(decoder)
}

/// Read and decode a witness file
pub fn load_witness(path: &Path, config: &SoferConfig) -> Result<Witness> {
    let decoder = decoder_for(path, config)?;
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let witness = decoder
        .decode(&mut reader)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    tracing::debug!(
        "Decoded witness '{}' with {} units",
        witness.siglum,
        witness.units.len()
    );
    Ok(witness)
}

/// Media type of the decoder that reads this file
pub fn media_type(path: &Path, config: &SoferConfig) -> Result<Option<String>> {
    let decoder = decoder_for(path, config)?;
    Ok(decoder.supported_mime_types().first().map(|m| m.to_string()))
}

/// Read a transcription, one witness per reading type
///
/// A TEI file with typed `<rdg>`s yields one witness per type unless the configuration
/// already picks one.
pub fn load_transcriptions(path: &Path, config: &SoferConfig) -> Result<Vec<Witness>> {
    if is_tei(path) && config.reading_type.is_none() {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        if !reading_types(&xml)?.is_empty() {
            let witnesses = config
                .tei_decoder()
                .decode_readings(&xml)
                .with_context(|| format!("Failed to decode {}", path.display()))?;
            tracing::debug!(
                "Split {} into {} reading witnesses",
                path.display(),
                witnesses.len()
            );
            return Ok(witnesses);
        }
    }
    Ok(vec![load_witness(path, config)?])
}

/// Output path for one reading witness: `apparatus.xml` becomes `apparatus-SR-qere.xml`
pub fn reading_output(path: &Path, siglum: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, siglum, ext.to_string_lossy()),
        None => format!("{}-{}", stem, siglum),
    };
    path.with_file_name(name)
}

/// Encoder for a format, set up from the configuration
pub fn encoder_for(format: &str, config: &SoferConfig) -> Result<Box<dyn Encoder>> {
    let encoder: Box<dyn Encoder> = match format.to_lowercase().as_str() {
        "context" | "tex" => Box::new(ContextEncoder::new().with_config(config.context.clone())),
        "latex" => Box::new(LatexEncoder::new().with_config(config.context.clone())),
        "usfm" | "sfm" => Box::new(UsfmEncoder::new().with_config(config.context.clone())),
        _ => encoder_for_format(format)
            .with_context(|| format!("No encoder available for {} format", format))?,
    };
    Ok(encoder)
}
