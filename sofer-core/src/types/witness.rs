//! A decoded witness: its units of tokens and whatever could not be read

use super::{Token, UnitId, UnitIssue};
use serde::{Deserialize, Serialize};

/// A single addressable unit and its tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub tokens: Vec<Token>,
}

impl Unit {
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            tokens: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }
}

/// A transcription or reference edition, split into units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    /// Siglum identifying the witness (e.g. `L`, `SR`)
    pub siglum: String,

    /// Units in document order
    pub units: Vec<Unit>,

    /// Units that were rejected while decoding
    pub issues: Vec<UnitIssue>,
}

impl Witness {
    pub fn new(siglum: impl Into<String>) -> Self {
        Self {
            siglum: siglum.into(),
            units: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn token_count(&self) -> usize {
        self.units.iter().map(|u| u.tokens.len()).sum()
    }
}
