//! Difference records: one per point of variation in a unit

use super::{Token, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Classification of a positional mismatch between the two witnesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// Present in the transcription, absent from the reference
    Addition,
    /// Present in the reference, absent from the transcription
    Omission,
    /// Differing tokens at an aligned position
    Substitution,
    /// Same tokens in a different order
    Transposition,
}

impl DifferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::Addition => "addition",
            DifferenceKind::Omission => "omission",
            DifferenceKind::Substitution => "substitution",
            DifferenceKind::Transposition => "transposition",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer grading of a substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionClass {
    /// Different words
    Lexical,
    /// Same words, plene versus defective spelling
    Orthographic,
    /// Same consonants, different vowels or accents
    Vocalic,
}

impl SubstitutionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubstitutionClass::Lexical => "lexical",
            SubstitutionClass::Orthographic => "orthographic",
            SubstitutionClass::Vocalic => "vocalic",
        }
    }
}

/// Which reading(s) carry a structural boundary caught inside a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPlacement {
    Reference,
    Transcription,
    Both,
}

impl BoundaryPlacement {
    pub fn from_sides(reference: bool, transcription: bool) -> Option<Self> {
        match (reference, transcription) {
            (true, true) => Some(BoundaryPlacement::Both),
            (true, false) => Some(BoundaryPlacement::Reference),
            (false, true) => Some(BoundaryPlacement::Transcription),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPlacement::Reference => "reference",
            BoundaryPlacement::Transcription => "transcription",
            BoundaryPlacement::Both => "both",
        }
    }
}

/// One recorded difference between transcription and reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub unit: UnitId,
    pub kind: DifferenceKind,

    /// 1-based, counted per kind within the unit
    pub discriminator: u32,

    /// Token indices into the reference unit
    pub reference_span: Range<usize>,

    /// Token indices into the transcription unit
    pub transcription_span: Range<usize>,

    pub reference: Vec<Token>,
    pub transcription: Vec<Token>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryPlacement>,

    /// Only set for substitutions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<SubstitutionClass>,
}

impl Difference {
    /// Apparatus type used by the renderers
    ///
    /// Vocalic and orthographic substitutions are labelled by their class, everything else by
    /// its kind.
    pub fn label(&self) -> &'static str {
        match (self.kind, self.class) {
            (DifferenceKind::Substitution, Some(SubstitutionClass::Vocalic)) => "vocalic",
            (DifferenceKind::Substitution, Some(SubstitutionClass::Orthographic)) => {
                "orthographic"
            }
            (kind, _) => kind.as_str(),
        }
    }

    pub fn carries_boundary(&self) -> bool {
        self.boundary.is_some()
    }
}
