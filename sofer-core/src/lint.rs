//! Transcription checks run before collation

use crate::normalize::{is_letter, Normalizer, HOLAM_HASER_FOR_VAV, VAV};
use crate::types::{TokenKind, Witness};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A Hebrew word without any marks
    UnpointedWord,
    /// Holam haser for vav (U+05BA) on a letter other than vav
    InvalidHolamHaser,
}

/// A suspicious word in a transcription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub unit: String,
    pub word: String,
    pub kind: FindingKind,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FindingKind::UnpointedWord => {
                write!(f, "Unpointed word {} in unit {}", self.word, self.unit)
            }
            FindingKind::InvalidHolamHaser => {
                write!(f, "Invalid holam haser in word {} in unit {}", self.word, self.unit)
            }
        }
    }
}

/// Check every word of a witness
pub fn inspect(witness: &Witness) -> Vec<Finding> {
    let bare = Normalizer::full();
    let mut findings = Vec::new();

    for unit in &witness.units {
        for token in unit.tokens.iter().filter(|t| t.kind == TokenKind::Word) {
            let finding = |kind| Finding {
                unit: unit.id.to_string(),
                word: token.text.clone(),
                kind,
            };
            if is_unpointed(&bare, &token.text) {
                findings.push(finding(FindingKind::UnpointedWord));
            }
            if has_invalid_holam_haser(&token.text) {
                findings.push(finding(FindingKind::InvalidHolamHaser));
            }
        }
    }
    findings
}

fn is_unpointed(bare: &Normalizer, word: &str) -> bool {
    word.chars().any(is_letter) && bare.normalize(word) == word.nfc().collect::<String>()
}

fn has_invalid_holam_haser(word: &str) -> bool {
    let mut previous = None;
    for c in word.chars() {
        if c == HOLAM_HASER_FOR_VAV && previous != Some(VAV) {
            return true;
        }
        previous = Some(c);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Token, Unit, UnitId};

    fn witness(words: &[&str]) -> Witness {
        let mut witness = Witness::new("SR");
        witness.add_unit(
            Unit::new(UnitId::verse(1, 1, 1))
                .with_tokens(words.iter().copied().map(Token::word).collect()),
        );
        witness
    }

    #[test]
    fn test_unpointed_word() {
        let findings = inspect(&witness(&["בראשית", "\u{05D1}\u{05B8}\u{05E8}\u{05B8}\u{05D0}"]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::UnpointedWord);
        assert_eq!(findings[0].unit, "B01K1V1");
        assert_eq!(findings[0].to_string(), "Unpointed word בראשית in unit B01K1V1");
    }

    #[test]
    fn test_holam_haser_placement() {
        let valid = "\u{05DE}\u{05B4}\u{05E6}\u{05B0}\u{05D5}\u{05BA}\u{05EA}";
        let invalid = "\u{05DC}\u{05BA}\u{05D0}";
        let findings = inspect(&witness(&[valid, invalid]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::InvalidHolamHaser);
        assert_eq!(findings[0].word, invalid);
    }

    #[test]
    fn test_non_hebrew_and_punctuation_are_skipped() {
        let mut witness = witness(&["abc"]);
        witness.units[0].tokens.push(Token::punctuation("׃"));
        assert!(inspect(&witness).is_empty());
    }
}
