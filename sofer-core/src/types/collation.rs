//! The result of collating one transcription against the reference

use super::{Difference, DivisionLevel, Token, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a unit could not be collated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum IssueKind {
    MalformedId,
    UnparseableToken(String),
    DuplicateUnit,
    MissingFromTranscription,
    MissingFromReference,
}

/// A unit that was reported and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIssue {
    /// Siglum of the witness the unit came from
    pub witness: String,

    /// The unit identifier as written in the source
    pub unit: String,

    pub kind: IssueKind,
}

impl UnitIssue {
    pub fn new(witness: impl Into<String>, unit: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            witness: witness.into(),
            unit: unit.into(),
            kind,
        }
    }
}

impl fmt::Display for UnitIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::MalformedId => {
                write!(f, "{}: malformed unit identifier '{}'", self.witness, self.unit)
            }
            IssueKind::UnparseableToken(detail) => write!(
                f,
                "{}: unparseable token in unit {}: {}",
                self.witness, self.unit, detail
            ),
            IssueKind::DuplicateUnit => {
                write!(f, "{}: unit {} occurs more than once", self.witness, self.unit)
            }
            IssueKind::MissingFromTranscription => write!(
                f,
                "{}: unit {} is missing from the transcription",
                self.witness, self.unit
            ),
            IssueKind::MissingFromReference => write!(
                f,
                "{}: unit {} has no counterpart in the reference",
                self.witness, self.unit
            ),
        }
    }
}

/// One reference unit with the differences found in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollatedUnit {
    pub id: UnitId,

    /// Reference tokens, normalized for display and comparison
    pub reference: Vec<Token>,

    /// Differences ordered by position
    pub differences: Vec<Difference>,

    /// The transcription has no usable text for this unit
    #[serde(default)]
    pub lacuna: bool,
}

impl CollatedUnit {
    /// Re-apply the recorded differences to the reference tokens
    ///
    /// Tokens outside the differences come from the reference, so the result equals the
    /// transcription on comparison keys.
    pub fn reconstruct_transcription(&self) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(self.reference.len());
        let mut cursor = 0;
        for difference in &self.differences {
            let start = difference.reference_span.start.max(cursor);
            tokens.extend_from_slice(&self.reference[cursor..start]);
            tokens.extend(difference.transcription.iter().cloned());
            cursor = difference.reference_span.end.max(start);
        }
        tokens.extend_from_slice(&self.reference[cursor.min(self.reference.len())..]);
        tokens
    }
}

/// Collation of a transcription against the reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collation {
    /// Siglum of the reference edition
    pub reference: String,

    /// Siglum of the transcription
    pub transcription: String,

    pub level: DivisionLevel,

    /// Reference units in document order
    pub units: Vec<CollatedUnit>,

    /// Units that were reported and skipped
    pub issues: Vec<UnitIssue>,
}

impl Collation {
    /// Iterate over all differences in document order
    pub fn differences(&self) -> impl Iterator<Item = &Difference> {
        self.units.iter().flat_map(|u| u.differences.iter())
    }

    pub fn difference_count(&self) -> usize {
        self.units.iter().map(|u| u.differences.len()).sum()
    }
}
