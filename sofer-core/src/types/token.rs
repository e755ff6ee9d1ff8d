//! Tokens: the smallest items compared during collation

use super::UnitId;
use serde::{Deserialize, Serialize};

/// Section break kinds found in the Masoretic layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Open section (petucha)
    Open,
    /// Closed section (setuma)
    Closed,
    /// Song layout break
    Song,
    /// Page break
    Page,
}

impl BreakKind {
    /// Parse the `type` attribute of a break element
    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "open" => Some(BreakKind::Open),
            "closed" => Some(BreakKind::Closed),
            "song" => Some(BreakKind::Song),
            "page" => Some(BreakKind::Page),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::Open => "open",
            BreakKind::Closed => "closed",
            BreakKind::Song => "song",
            BreakKind::Page => "page",
        }
    }

    /// Conventional bracketed letter used for this break in plain text
    pub fn marker(&self) -> &'static str {
        match self {
            BreakKind::Open => "{פ}",
            BreakKind::Closed => "{ס}",
            BreakKind::Song => "{ר}",
            BreakKind::Page => "{ש}",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        [
            BreakKind::Open,
            BreakKind::Closed,
            BreakKind::Song,
            BreakKind::Page,
        ]
        .into_iter()
        .find(|kind| kind.marker() == marker)
    }
}

/// What a token stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    Punctuation,
    Break(BreakKind),
    /// Division marker below the collation level (e.g. a verse inside a chapter unit)
    Boundary(UnitId),
}

/// A single token of a witness
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,

    /// Display form
    pub text: String,

    /// Comparison key
    pub norm: String,
}

impl Token {
    /// Create a token whose comparison key is its text
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind,
            norm: text.clone(),
            text,
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Word, text)
    }

    pub fn punctuation(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Punctuation, text)
    }

    pub fn section_break(kind: BreakKind) -> Self {
        Self::new(TokenKind::Break(kind), kind.marker())
    }

    pub fn boundary(id: UnitId) -> Self {
        Self::new(TokenKind::Boundary(id), format!("|{}|", id))
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, TokenKind::Boundary(_))
    }

    /// Whether normalization applies to this token's text
    pub fn is_textual(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Punctuation)
    }
}
