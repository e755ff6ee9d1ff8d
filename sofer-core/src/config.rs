//! Run configuration shared by the CLI subcommands

use crate::decoder::TeiDecoder;
use crate::encoder::ContextConfig;
use crate::error::ConfigError;
use crate::normalize::{MarkClass, Normalization, Normalizer, SpellingScheme};
use crate::types::DivisionLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for decoding, normalizing and rendering a collation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoferConfig {
    /// Division level units are collated at
    pub level: DivisionLevel,

    /// Mark classes removed from the text shown in the apparatus
    pub display_strip: Vec<MarkClass>,

    /// Mark classes removed before tokens are compared
    pub compare_strip: Vec<MarkClass>,

    /// TEI elements skipped with their content
    pub ignored_tags: Vec<String>,

    /// Preferred `rdg/@type` inside `<app>`
    pub reading_type: Option<String>,

    pub spelling: SpellingScheme,
    pub ignore_punctuation: bool,
    pub ignore_breaks: bool,

    pub context: ContextConfig,
}

impl Default for SoferConfig {
    fn default() -> Self {
        Self {
            level: DivisionLevel::Verse,
            display_strip: Vec::new(),
            compare_strip: MarkClass::ALL.to_vec(),
            ignored_tags: Vec::new(),
            reading_type: None,
            spelling: SpellingScheme::None,
            ignore_punctuation: false,
            ignore_breaks: false,
            context: ContextConfig::default(),
        }
    }
}

impl SoferConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject settings that would leave nothing to collate
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tag in &self.ignored_tags {
            if matches!(tag.as_str(), "TEI" | "text" | "body") {
                return Err(ConfigError::Invalid(format!(
                    "ignoring <{}> would skip the whole document",
                    tag
                )));
            }
        }
        if self.reading_type.as_deref() == Some("") {
            return Err(ConfigError::Invalid("empty reading type".to_string()));
        }
        Ok(())
    }

    /// TEI decoder set up with these options
    pub fn tei_decoder(&self) -> TeiDecoder {
        let mut decoder = TeiDecoder::new()
            .with_level(self.level)
            .with_ignored_tags(self.ignored_tags.iter().cloned())
            .with_ignore_punctuation(self.ignore_punctuation)
            .with_ignore_breaks(self.ignore_breaks);
        if let Some(reading_type) = &self.reading_type {
            decoder = decoder.with_reading_type(reading_type.clone());
        }
        decoder
    }

    /// Display and comparison normalizers, sharing the spelling table
    pub fn normalization(&self) -> Normalization {
        let normalization = Normalization::new(
            Normalizer::new().with_strip(self.display_strip.iter().copied()),
            Normalizer::new().with_strip(self.compare_strip.iter().copied()),
        );
        match self.spelling.table() {
            Some(table) => normalization.with_spelling(table),
            None => normalization,
        }
    }
}
