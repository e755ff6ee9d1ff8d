//! Token normalization
//!
//! Raw forms are decomposed, looked up in an optional spelling table, stripped of the
//! configured mark classes and recomposed. The same normalizers run over both witnesses.

mod marks;
mod plene;
mod spelling;

pub use marks::{is_letter, MarkClass};
pub(crate) use marks::{HOLAM_HASER_FOR_VAV, VAV};
pub use plene::strip_plene;
pub use spelling::{skeleton, SpellingScheme, SpellingTable};

use crate::types::{Token, TokenKind};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Normalizes the text of words and punctuation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    strip: BTreeSet<MarkClass>,
    spelling: Option<SpellingTable>,
}

impl Normalizer {
    /// A normalizer that only applies Unicode normalization
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer that strips every mark class, leaving bare consonants
    pub fn full() -> Self {
        MarkClass::ALL
            .iter()
            .fold(Self::new(), |normalizer, class| normalizer.strip(*class))
    }

    pub fn strip(mut self, class: MarkClass) -> Self {
        self.strip.insert(class);
        self
    }

    pub fn with_strip(mut self, classes: impl IntoIterator<Item = MarkClass>) -> Self {
        self.strip.extend(classes);
        self
    }

    pub fn with_spelling(mut self, table: SpellingTable) -> Self {
        self.spelling = Some(table);
        self
    }

    pub fn stripped_classes(&self) -> impl Iterator<Item = &MarkClass> {
        self.strip.iter()
    }

    pub fn has_spelling(&self) -> bool {
        self.spelling.is_some()
    }

    /// Normalize a word form
    pub fn normalize(&self, word: &str) -> String {
        let decomposed: String = word.nfkd().collect();
        let spelled = match &self.spelling {
            Some(table) => table.lookup(&decomposed).unwrap_or(decomposed.as_str()),
            None => decomposed.as_str(),
        };
        spelled
            .chars()
            .filter(|c| !self.strip.iter().any(|class| class.contains(*c)))
            .collect::<String>()
            .nfc()
            .collect()
    }

    /// Normalize punctuation: Unicode normalization only
    pub fn normalize_punctuation(&self, text: &str) -> String {
        text.nfc().collect()
    }

    /// Normalize a token's text for display
    pub fn display(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Word => self.normalize(&token.text),
            TokenKind::Punctuation => self.normalize_punctuation(&token.text),
            _ => token.text.clone(),
        }
    }

    /// Normalize a token's comparison key
    pub fn key(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Word => self.normalize(&token.norm),
            TokenKind::Punctuation => self.normalize_punctuation(&token.norm),
            _ => token.norm.clone(),
        }
    }
}

/// The pair of normalizers applied before collation
///
/// `display` produces the text shown in the apparatus and `comparison` the key tokens are
/// aligned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalization {
    pub display: Normalizer,
    pub comparison: Normalizer,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            display: Normalizer::new(),
            comparison: Normalizer::full(),
        }
    }
}

impl Normalization {
    pub fn new(display: Normalizer, comparison: Normalizer) -> Self {
        Self {
            display,
            comparison,
        }
    }

    /// Use the same spelling table on both sides
    pub fn with_spelling(self, table: SpellingTable) -> Self {
        Self {
            display: self.display.with_spelling(table.clone()),
            comparison: self.comparison.with_spelling(table),
        }
    }

    /// Normalize a token: `text` from the display normalizer, `norm` from the comparison one
    pub fn apply(&self, token: &Token) -> Token {
        Token {
            kind: token.kind,
            text: self.display.display(token),
            norm: self.comparison.key(token),
        }
    }

    pub fn apply_all(&self, tokens: &[Token]) -> Vec<Token> {
        tokens.iter().map(|t| self.apply(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakKind;

    const BERESHIT: &str = "\u{05D1}\u{05BC}\u{05B0}\u{05E8}\u{05B5}\u{05D0}\u{05E9}\u{05B4}\u{05C1}\u{0596}\u{05D9}\u{05EA}";

    #[test]
    fn test_full_strip_leaves_consonants() {
        assert_eq!(Normalizer::full().normalize(BERESHIT), "בראשית");
    }

    #[test]
    fn test_strip_cantillation_only() {
        let normalizer = Normalizer::new().strip(MarkClass::Cantillation);
        let result = normalizer.normalize(BERESHIT);
        assert!(!result.contains('\u{0596}'));
        assert!(result.contains('\u{05B4}'));
        assert!(result.contains('\u{05BC}'));
    }

    #[test]
    fn test_no_strip_is_nfc() {
        let result = Normalizer::new().normalize(BERESHIT);
        let nfc: String = BERESHIT.nfc().collect();
        assert_eq!(result, nfc);
    }

    #[test]
    fn test_spelling_before_strip() {
        let normalizer = Normalizer::new()
            .strip(MarkClass::Cantillation)
            .with_spelling(SpellingTable::sro());
        let expected: String = "יַהְוֶה".nfc().collect();
        let pointed = "\u{05D9}\u{05B0}\u{05D4}\u{05B8}\u{0591}\u{05D5}\u{05B8}\u{05D4}";
        assert_eq!(normalizer.normalize(pointed), expected);
    }

    #[test]
    fn test_normalize_is_idempotent_on_samples() {
        let normalizers = [
            Normalizer::new(),
            Normalizer::full(),
            Normalizer::new().strip(MarkClass::Cantillation),
            Normalizer::full().with_spelling(SpellingTable::sro()),
            Normalizer::new()
                .strip(MarkClass::Extraordinaire)
                .with_spelling(SpellingTable::sro_chronicles()),
        ];
        for normalizer in &normalizers {
            for word in [BERESHIT, "וּבִירוּשָׁלַם", "יְהוָה", "\u{05D0}\u{05C4}\u{05D1}"] {
                let once = normalizer.normalize(word);
                assert_eq!(normalizer.normalize(&once), once, "{:?}", normalizer);
            }
        }
    }

    #[test]
    fn test_apply_sets_text_and_key() {
        let normalization = Normalization::default();
        let token = normalization.apply(&Token::word(BERESHIT));
        assert_eq!(token.norm, "בראשית");
        assert_eq!(token.text, BERESHIT.nfc().collect::<String>());
    }

    #[test]
    fn test_structural_tokens_untouched() {
        let normalization = Normalization::default();
        let token = Token::section_break(BreakKind::Open);
        assert_eq!(normalization.apply(&token), token);
        assert_eq!(token.kind, TokenKind::Break(BreakKind::Open));
    }
}
