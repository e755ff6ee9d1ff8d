//! Plain-text witness decoder
//!
//! One unit per line:
//!
//! ```text
//! @siglum L
//! # comments are skipped
//! B01K1V1 בְּרֵאשִׁית בָּרָא אֱלֹהִים ׃ {פ}
//! ```
//!
//! `|B01K1V2|` inside a line marks a division below the line's unit.

use crate::error::ParseError;
use crate::types::{BreakKind, IssueKind, Token, Unit, UnitId, UnitIssue, Witness};
use std::io::Read;

const SOF_PASUQ: char = '\u{05C3}';
const PASEQ: char = '\u{05C0}';
const MAQAF: char = '\u{05BE}';

fn is_punctuation(c: char) -> bool {
    matches!(c, SOF_PASUQ | PASEQ | MAQAF)
}

/// Decoder for line-oriented plain text witnesses
#[derive(Debug, Clone, Default)]
pub struct PlainDecoder {
    ignore_punctuation: bool,
    ignore_breaks: bool,
    siglum: Option<String>,
}

impl PlainDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_punctuation(mut self, ignore: bool) -> Self {
        self.ignore_punctuation = ignore;
        self
    }

    pub fn with_ignore_breaks(mut self, ignore: bool) -> Self {
        self.ignore_breaks = ignore;
        self
    }

    /// Siglum to use when the text has no `@siglum` line
    pub fn with_siglum(mut self, siglum: impl Into<String>) -> Self {
        self.siglum = Some(siglum.into());
        self
    }

    pub fn decode_str(&self, text: &str) -> Result<Witness, ParseError> {
        let mut siglum = None;
        let mut units = Vec::new();
        let mut issues = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("@siglum") {
                siglum = Some(rest.trim().to_string());
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(label) = fields.next() else {
                continue;
            };
            let id: UnitId = match label.parse() {
                Ok(id) => id,
                Err(_) => {
                    issues.push((label.to_string(), IssueKind::MalformedId));
                    continue;
                }
            };

            match self.tokenize(fields) {
                Ok(tokens) => units.push(Unit::new(id).with_tokens(tokens)),
                Err(detail) => issues.push((id.to_string(), IssueKind::UnparseableToken(detail))),
            }
        }

        let siglum = siglum
            .filter(|s| !s.is_empty())
            .or_else(|| self.siglum.clone())
            .ok_or_else(|| ParseError::MissingField("@siglum".to_string()))?;

        let mut witness = Witness::new(siglum);
        witness.units = units;
        witness.issues = issues
            .into_iter()
            .map(|(unit, kind)| UnitIssue::new(witness.siglum.clone(), unit, kind))
            .collect();
        Ok(witness)
    }

    fn tokenize<'a>(&self, fields: impl Iterator<Item = &'a str>) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        for field in fields {
            if let Some(kind) = BreakKind::from_marker(field) {
                if !self.ignore_breaks {
                    tokens.push(Token::section_break(kind));
                }
                continue;
            }
            if let Some(inner) = field.strip_prefix('|').and_then(|f| f.strip_suffix('|')) {
                let id = inner
                    .parse::<UnitId>()
                    .map_err(|_| format!("bad boundary marker '{}'", field))?;
                tokens.push(Token::boundary(id));
                continue;
            }
            if field.starts_with('{') {
                return Err(format!("unknown break marker '{}'", field));
            }

            // Split attached maqaf and sof pasuq off the words around them
            let mut word = String::new();
            for c in field.chars() {
                if is_punctuation(c) {
                    if !word.is_empty() {
                        tokens.push(Token::word(std::mem::take(&mut word)));
                    }
                    if !self.ignore_punctuation {
                        tokens.push(Token::punctuation(c.to_string()));
                    }
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                tokens.push(Token::word(word));
            }
        }
        Ok(tokens)
    }
}

impl super::Decoder for PlainDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<Witness, ParseError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.decode_str(&text)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }
}
