//! Classes of Hebrew diacritics that can be normalized out

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A set of combining marks that normalization may strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkClass {
    /// Accents, meteg and zero-width (non-)joiners
    Cantillation,
    /// Vowel points, dagesh, rafe and shin/sin dots
    Pointing,
    /// Upper and lower puncta extraordinaria
    Extraordinaire,
}

impl MarkClass {
    pub const ALL: [MarkClass; 3] = [
        MarkClass::Cantillation,
        MarkClass::Pointing,
        MarkClass::Extraordinaire,
    ];

    pub fn contains(&self, c: char) -> bool {
        match self {
            // Meteg (U+05BD) is named as a point but behaves as an accent
            MarkClass::Cantillation => matches!(
                c,
                '\u{0591}'..='\u{05AF}' | '\u{05BD}' | '\u{200C}'..='\u{200D}'
            ),
            MarkClass::Pointing => matches!(
                c,
                '\u{05B0}'..='\u{05BC}' | '\u{05BF}' | '\u{05C1}'..='\u{05C2}' | '\u{05C7}'
            ),
            MarkClass::Extraordinaire => matches!(c, '\u{05C4}'..='\u{05C5}'),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkClass::Cantillation => "cantillation",
            MarkClass::Pointing => "pointing",
            MarkClass::Extraordinaire => "extraordinaire",
        }
    }
}

impl fmt::Display for MarkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cantillation" => Ok(MarkClass::Cantillation),
            "pointing" => Ok(MarkClass::Pointing),
            "extraordinaire" => Ok(MarkClass::Extraordinaire),
            _ => Err(ParseError::UnknownMarkClass(s.to_string())),
        }
    }
}

/// Hebrew consonant, including final forms
pub fn is_letter(c: char) -> bool {
    matches!(c, '\u{05D0}'..='\u{05EA}')
}

pub(crate) const DAGESH: char = '\u{05BC}';
pub(crate) const HOLAM: char = '\u{05B9}';
pub(crate) const HOLAM_HASER_FOR_VAV: char = '\u{05BA}';
pub(crate) const QUBUTS: char = '\u{05BB}';
pub(crate) const ALEF: char = '\u{05D0}';
pub(crate) const VAV: char = '\u{05D5}';
pub(crate) const YOD: char = '\u{05D9}';
pub(crate) const SHEVA: char = '\u{05B0}';
pub(crate) const HIRIQ: char = '\u{05B4}';
pub(crate) const TSERE: char = '\u{05B5}';
pub(crate) const SEGOL: char = '\u{05B6}';

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_disjoint() {
        for c in '\u{0590}'..='\u{05FF}' {
            let hits = MarkClass::ALL.iter().filter(|m| m.contains(c)).count();
            assert!(hits <= 1, "U+{:04X} belongs to {} classes", c as u32, hits);
        }
    }

    #[test]
    fn test_representative_marks() {
        assert!(MarkClass::Cantillation.contains('\u{0591}')); // etnahta
        assert!(MarkClass::Cantillation.contains('\u{05BD}')); // meteg
        assert!(MarkClass::Pointing.contains('\u{05B8}')); // qamats
        assert!(MarkClass::Pointing.contains(DAGESH));
        assert!(MarkClass::Extraordinaire.contains('\u{05C4}'));
        assert!(MarkClass::Pointing.contains(HOLAM_HASER_FOR_VAV));
        assert!(!MarkClass::Pointing.contains(ALEF));
    }

    #[test]
    fn test_parse_mark_class() {
        assert_eq!("Pointing".parse::<MarkClass>().unwrap(), MarkClass::Pointing);
        assert!("vowels".parse::<MarkClass>().is_err());
    }
}
