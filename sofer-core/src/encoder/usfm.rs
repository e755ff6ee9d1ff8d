//! USFM encoder for Bible software
//!
//! Each book opens with its identification and table-of-contents markers. Apparatus entries
//! become `\f` footnotes, and the lemma in the running text is bracketed with the critical
//! signs of its kind.

use super::ContextConfig;
use crate::error::RenderError;
use crate::types::{
    BreakKind, CollatedUnit, Collation, Difference, DifferenceKind, Part, Token, TokenKind, UnitId,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;

/// USFM code, English name and SBL abbreviation per book, `B01` first
const BOOKS: [(&str, &str, &str); 39] = [
    ("GEN", "Genesis", "Gen"),
    ("EXO", "Exodus", "Exod"),
    ("LEV", "Leviticus", "Lev"),
    ("NUM", "Numbers", "Num"),
    ("DEU", "Deuteronomy", "Deut"),
    ("JOS", "Joshua", "Josh"),
    ("JDG", "Judges", "Judg"),
    ("1SA", "1 Samuel", "1 Sam"),
    ("2SA", "2 Samuel", "2 Sam"),
    ("1KI", "1 Kings", "1 Kgs"),
    ("2KI", "2 Kings", "2 Kgs"),
    ("ISA", "Isaiah", "Isa"),
    ("JER", "Jeremiah", "Jer"),
    ("EZK", "Ezekiel", "Ezek"),
    ("HOS", "Hosea", "Hos"),
    ("JOL", "Joel", "Joel"),
    ("AMO", "Amos", "Amos"),
    ("OBA", "Obadiah", "Obad"),
    ("JON", "Jonah", "Jonah"),
    ("MIC", "Micah", "Mic"),
    ("NAM", "Nahum", "Nah"),
    ("HAB", "Habakkuk", "Hab"),
    ("ZEP", "Zephaniah", "Zeph"),
    ("HAG", "Haggai", "Hag"),
    ("ZEC", "Zechariah", "Zech"),
    ("MAL", "Malachi", "Mal"),
    ("PSA", "Psalms", "Pss"),
    ("PRO", "Proverbs", "Prov"),
    ("JOB", "Job", "Job"),
    ("SNG", "Song of Songs", "Song"),
    ("RUT", "Ruth", "Ruth"),
    ("LAM", "Lamentations", "Lam"),
    ("ECC", "Ecclesiastes", "Eccl"),
    ("EST", "Esther", "Esth"),
    ("DAN", "Daniel", "Dan"),
    ("EZR", "Ezra", "Ezra"),
    ("NEH", "Nehemiah", "Neh"),
    ("1CH", "1 Chronicles", "1 Chr"),
    ("2CH", "2 Chronicles", "2 Chr"),
];

// An open section that ends a chapter belongs after the next \c
static PARAGRAPH_BEFORE_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\p\s*\\c (\d+)\s*\\m").expect("paragraph pattern"));

/// USFM book code for a book number
pub fn book_code(book: u32) -> Option<&'static str> {
    book_names(book).map(|(code, _, _)| code)
}

fn book_names(book: u32) -> Option<(&'static str, &'static str, &'static str)> {
    let index = usize::try_from(book).ok()?.checked_sub(1)?;
    BOOKS.get(index).copied()
}

/// Writes a collation as a USFM book with footnoted apparatus
pub struct UsfmEncoder {
    pub config: ContextConfig,
}

impl UsfmEncoder {
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    /// Take sigla and ignored labels from shared presentation settings
    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ignored_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .ignored_labels
            .extend(labels.into_iter().map(Into::into));
        self
    }

    fn siglum<'a>(&'a self, witness: &'a str) -> &'a str {
        self.config
            .sigla
            .get(witness)
            .map(String::as_str)
            .unwrap_or(witness)
    }

    /// Convert a collation to USFM source
    pub fn collation_to_usfm(&self, collation: &Collation) -> Result<String, RenderError> {
        let sigla = self.siglum(&collation.transcription);
        let mut usfm = String::new();
        let mut book: Option<u32> = None;
        let mut chapter: Option<u32> = None;

        for unit in &collation.units {
            if book != Some(unit.id.book) {
                book = Some(unit.id.book);
                chapter = None;
                usfm.push_str(&book_header(unit.id.book, collation)?);
            }

            match unit.id.part {
                Part::Incipit => usfm.push_str("\\mt "),
                Part::Chapter(k) | Part::Verse(k, _) if chapter != Some(k) => {
                    chapter = Some(k);
                    usfm.push_str(&format!("\n\\c {}\n\\m", k));
                }
                _ => {}
            }
            if let Part::Verse(_, v) = unit.id.part {
                usfm.push_str(&format!("\n\\v {} ", v));
            }

            usfm.push_str(&self.unit_to_usfm(unit, sigla));
        }

        let usfm = PARAGRAPH_BEFORE_CHAPTER.replace_all(&usfm, "\\c ${1}\n\\p");
        Ok(usfm.replace("\n\n", "\n").replace("  ", " "))
    }

    fn unit_to_usfm(&self, unit: &CollatedUnit, sigla: &str) -> String {
        let mut usfm = String::new();
        let mut at = unit.id;
        let mut differences = unit.differences.iter().peekable();
        let mut position = 0;

        loop {
            if let Some(difference) =
                differences.next_if(|d| d.reference_span.start == position)
            {
                usfm.push_str(&self.app_to_usfm(difference, at, sigla));
                for token in &difference.reference {
                    advance(&mut at, token);
                }
                position = difference.reference_span.end;
                continue;
            }
            let Some(token) = unit.reference.get(position) else {
                break;
            };
            advance(&mut at, token);
            usfm.push_str(&body_token(token));
            position += 1;
        }
        usfm
    }

    fn app_to_usfm(&self, difference: &Difference, at: UnitId, sigla: &str) -> String {
        let lemma: String = difference.reference.iter().map(body_token).collect();
        if self.config.ignored_labels.contains(difference.label()) {
            return lemma;
        }

        let (open, close) = critical_signs(difference.kind);
        let note = format!(
            "\\f - \\fr {} \\ft {} {}\\fw {} \\fw* \\f*",
            reference_label(at),
            open,
            reading_to_usfm(&difference.transcription),
            sigla
        );
        match difference.kind {
            DifferenceKind::Addition => format!("{}{} ", note, open),
            _ => format!("{}{} {}{} ", note, open, lemma, close),
        }
    }
}

impl Default for UsfmEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Encoder for UsfmEncoder {
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError> {
        let usfm = self.collation_to_usfm(collation)?;
        writer.write_all(usfm.as_bytes())?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "USFM"
    }

    fn file_extension(&self) -> &str {
        "sfm"
    }

    fn mime_type(&self) -> &str {
        "text/x-usfm"
    }
}

fn book_header(book: u32, collation: &Collation) -> Result<String, RenderError> {
    let (code, name, abbreviation) = book_names(book)
        .ok_or_else(|| RenderError::EncodingFailed(format!("no USFM book code for B{:02}", book)))?;
    Ok(format!(
        "\\id {} - {} collated against {}\n\\h {}\n\\toc1 The Book of {}\n\\toc2 {}\n\\toc3 {}\n",
        code, collation.transcription, collation.reference, name, name, name, abbreviation
    ))
}

/// Opening and closing sign around the lemma
fn critical_signs(kind: DifferenceKind) -> (&'static str, &'static str) {
    match kind {
        DifferenceKind::Addition => ("\u{2E06}", ""),
        DifferenceKind::Omission => ("\u{2E0B}", "\u{2E0C}"),
        DifferenceKind::Transposition => ("\u{2E0A}", "\u{2E09}"),
        DifferenceKind::Substitution => ("\u{2E03}", "\u{2E02}"),
    }
}

fn advance(at: &mut UnitId, token: &Token) {
    if let TokenKind::Boundary(id) = token.kind {
        *at = id;
    }
}

/// `chapter:verse` for the footnote reference
fn reference_label(id: UnitId) -> String {
    match id.part {
        Part::Verse(k, v) => format!("{}:{}", k, v),
        Part::Chapter(k) => k.to_string(),
        Part::Incipit => "incipit".to_string(),
        Part::Explicit => "explicit".to_string(),
        Part::Whole => String::new(),
    }
}

/// A token in running text
fn body_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Word | TokenKind::Punctuation => format!("{} ", token.text),
        TokenKind::Break(BreakKind::Open) => format!("{}\n\\p\n", BreakKind::Open.marker()),
        TokenKind::Break(BreakKind::Closed) => format!("{} ", BreakKind::Closed.marker()),
        TokenKind::Break(BreakKind::Page) => "\n\\pb\n".to_string(),
        TokenKind::Break(BreakKind::Song) => String::new(),
        TokenKind::Boundary(id) => match id.part {
            Part::Chapter(k) => format!("\n\\c {}\n\\m", k),
            Part::Verse(_, v) => format!("\n\\v {} ", v),
            _ => String::new(),
        },
    }
}

/// Tokens of a footnote reading; divisions are set in bold instead of as markers
fn reading_to_usfm(tokens: &[Token]) -> String {
    let reading: String = tokens
        .iter()
        .map(|token| match token.kind {
            TokenKind::Word | TokenKind::Punctuation => format!("{} ", token.text),
            TokenKind::Break(kind @ (BreakKind::Open | BreakKind::Closed)) => {
                format!("{} ", kind.marker())
            }
            TokenKind::Break(_) => String::new(),
            TokenKind::Boundary(id) => match id.part {
                Part::Chapter(k) => format!("\\bd {}:\\bd*", k),
                Part::Verse(_, v) => format!("\\bd {}\\bd* ", v),
                _ => String::new(),
            },
        })
        .collect();
    if reading.is_empty() {
        "\u{2013} ".to_string()
    } else {
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::Collator;
    use crate::encoder::Encoder;
    use crate::types::DivisionLevel;

    fn words(s: &str) -> Vec<Token> {
        s.split_whitespace().map(Token::word).collect()
    }

    fn collation(units: Vec<CollatedUnit>) -> Collation {
        Collation {
            reference: "WLC".to_string(),
            transcription: "SR".to_string(),
            level: DivisionLevel::Verse,
            units,
            issues: vec![],
        }
    }

    #[test]
    fn test_book_codes() {
        assert_eq!(book_code(1), Some("GEN"));
        assert_eq!(book_code(12), Some("ISA"));
        assert_eq!(book_code(39), Some("2CH"));
        assert_eq!(book_code(0), None);
        assert_eq!(book_code(40), None);
    }

    #[test]
    fn test_substitution_footnote() {
        let unit = Collator::default().collate_unit(
            UnitId::verse(1, 1, 1),
            &words("a b c"),
            &words("a x c"),
        );
        let usfm = UsfmEncoder::new()
            .collation_to_usfm(&collation(vec![unit]))
            .unwrap();

        assert!(usfm.starts_with(
            "\\id GEN - SR collated against WLC\n\\h Genesis\n\\toc1 The Book of Genesis\n\\toc2 Genesis\n\\toc3 Gen\n"
        ));
        assert!(usfm.contains(
            "\\c 1\n\\m\n\\v 1 a \\f - \\fr 1:1 \\ft \u{2E03} x \\fw SR \\fw* \\f*\u{2E03} b \u{2E02} c "
        ));
    }

    #[test]
    fn test_omission_reads_as_dash() {
        let unit =
            Collator::default().collate_unit(UnitId::verse(1, 1, 1), &words("a b"), &words("a"));
        let usfm = UsfmEncoder::new()
            .collation_to_usfm(&collation(vec![unit]))
            .unwrap();

        assert!(usfm.contains("\\ft \u{2E0B} \u{2013} \\fw SR \\fw* \\f*\u{2E0B} b \u{2E0C} "));
    }

    #[test]
    fn test_ignored_labels_keep_lemma() {
        let unit = Collator::default().collate_unit(
            UnitId::verse(1, 1, 1),
            &words("a b c"),
            &words("a x c"),
        );
        let usfm = UsfmEncoder::new()
            .with_ignored_labels(["substitution"])
            .collation_to_usfm(&collation(vec![unit]))
            .unwrap();

        assert!(!usfm.contains("\\f "));
        assert!(usfm.contains("\\v 1 a b c "));
    }

    #[test]
    fn test_open_section_moves_after_chapter() {
        let first = vec![Token::word("a"), Token::section_break(BreakKind::Open)];
        let second = words("b");
        let collator = Collator::default();
        let units = vec![
            collator.collate_unit(UnitId::verse(1, 1, 1), &first, &first),
            collator.collate_unit(UnitId::verse(1, 2, 1), &second, &second),
        ];
        let usfm = UsfmEncoder::new()
            .collation_to_usfm(&collation(units))
            .unwrap();

        assert!(usfm.contains("a {\u{05E4}}\n\\c 2\n\\p\n\\v 1 b "));
    }

    #[test]
    fn test_boundary_in_reading_is_bold() {
        let reference = vec![
            Token::boundary(UnitId::verse(1, 1, 1)),
            Token::word("a"),
            Token::word("b"),
        ];
        let transcription = vec![
            Token::boundary(UnitId::verse(1, 1, 1)),
            Token::word("a"),
            Token::boundary(UnitId::verse(1, 1, 2)),
            Token::word("b"),
        ];
        let unit =
            Collator::default().collate_unit(UnitId::chapter(1, 1), &reference, &transcription);
        let usfm = UsfmEncoder::new()
            .collation_to_usfm(&collation(vec![unit]))
            .unwrap();

        assert!(usfm.contains("\\fr 1:1 \\ft \u{2E06} \\bd 2\\bd* \\fw SR \\fw* \\f*\u{2E06} b "));
    }

    #[test]
    fn test_unknown_book_is_an_error() {
        let unit =
            Collator::default().collate_unit(UnitId::verse(40, 1, 1), &words("a"), &words("a"));
        let mut out = Vec::new();
        let err = UsfmEncoder::new().encode(&collation(vec![unit]), &mut out);
        assert!(matches!(err, Err(RenderError::EncodingFailed(_))));
    }
}
