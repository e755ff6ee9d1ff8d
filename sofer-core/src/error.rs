//! Error types for Sofer Core

use thiserror::Error;

/// Result type alias using SoferError
pub type Result<T> = std::result::Result<T, SoferError>;

/// Top-level error type for all Sofer operations
#[derive(Debug, Error)]
pub enum SoferError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Collation error: {0}")]
    Collation(#[from] CollationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while reading transcriptions
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    #[error("Malformed unit identifier: {0}")]
    MalformedUnitId(String),

    #[error("Unknown division level: {0}")]
    UnknownLevel(String),

    #[error("Unknown mark class: {0}")]
    UnknownMarkClass(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed content: {0}")]
    MalformedContent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        ParseError::InvalidXml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::InvalidXml(e.to_string())
    }
}

/// Errors that stop a collation as a whole
///
/// Problems with single units are reported as [`crate::types::UnitIssue`]s instead.
#[derive(Debug, Error)]
pub enum CollationError {
    #[error("Reference witness '{0}' has no collatable units")]
    EmptyReference(String),
}

/// Errors that occur while writing apparatus markup
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for RenderError {
    fn from(e: quick_xml::Error) -> Self {
        RenderError::EncodingFailed(e.to_string())
    }
}

/// Errors in configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
