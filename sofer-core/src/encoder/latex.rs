//! LaTeX encoder for the memoir-based layout
//!
//! The reference text runs in right-to-left columns. Every difference is set as a begin/end
//! macro pair around the lemma, with the readings as the begin macro's argument:
//!
//! ```text
//! \SubBegin{\Reading{reading}\Witness{sigla}}lemma\SubEnd{}
//! ```

use super::ContextConfig;
use crate::error::RenderError;
use crate::types::{
    BreakKind, CollatedUnit, Collation, Difference, DifferenceKind, Part, Token, TokenKind,
};
use std::io::Write;

const COLUMNS_START: &str =
    "\n\\cleardoublespace\n\\RTLmulticolcolumns\n\\begin{multicols*}{\\ncols}\n";
const COLUMNS_END: &str = "\\par\n\\end{multicols*}\n";

/// Writes a collation as a LaTeX document or subfile
pub struct LatexEncoder {
    pub config: ContextConfig,
}

impl LatexEncoder {
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Write a subfile of this parent document instead of a standalone one
    pub fn with_subfiles(mut self, parent: impl Into<String>) -> Self {
        self.config.subfiles = Some(parent.into());
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

    pub fn collation_to_latex(&self, collation: &Collation) -> String {
        let mut latex = match &self.config.subfiles {
            Some(parent) => format!("\\documentclass[{}]{{subfiles}}\n", parent),
            None => "\\documentclass{memoir}\n".to_string(),
        };
        latex.push_str("\\begin{document}\n\\selectlanguage{hebrew}\n");

        let sigla = self.siglum(&collation.transcription);
        let mut book: Option<u32> = None;
        let mut chapter: Option<u32> = None;
        let mut columns = false;

        for unit in &collation.units {
            if book != Some(unit.id.book) {
                if columns {
                    latex.push_str(COLUMNS_END);
                    columns = false;
                }
                book = Some(unit.id.book);
                chapter = None;
                if let Some(title) = self.config.book_titles.get(&format!("B{:02}", unit.id.book))
                {
                    latex.push_str(&format!("\\Book{{{}}}\n", escape_latex(title)));
                }
            }

            let mut opened_chapter = false;
            match unit.id.part {
                Part::Incipit => latex.push_str("\\thispagestyle{empty}\n\\Incipit{}"),
                Part::Explicit => latex.push_str("\\Explicit{}"),
                Part::Chapter(k) | Part::Verse(k, _) if chapter != Some(k) => {
                    if columns {
                        latex.push_str("\\PreChapterSpace{}");
                    } else {
                        latex.push_str(COLUMNS_START);
                        columns = true;
                    }
                    chapter = Some(k);
                    opened_chapter = true;
                    latex.push_str(&format!("\\Chapter{{{}}}", k));
                }
                _ => {}
            }
            if let Part::Verse(_, v) = unit.id.part {
                if !opened_chapter {
                    latex.push_str("\\PreVerseSpace{}");
                }
                latex.push_str(&format!("\\Verse{{{}}}", v));
            }

            latex.push_str(&self.unit_to_latex(unit, sigla));
        }
        if columns {
            latex.push_str(COLUMNS_END);
        }

        for issue in &collation.issues {
            latex.push_str(&format!("% {}\n", issue));
        }
        latex.push_str("\\end{document}\n");
        latex
    }

    fn unit_to_latex(&self, unit: &CollatedUnit, sigla: &str) -> String {
        let mut latex = String::new();
        let mut differences = unit.differences.iter().peekable();
        let mut position = 0;

        loop {
            if let Some(difference) =
                differences.next_if(|d| d.reference_span.start == position)
            {
                latex.push_str(&self.app_to_latex(difference, sigla));
                position = difference.reference_span.end;
                continue;
            }
            let Some(token) = unit.reference.get(position) else {
                break;
            };
            latex.push_str(&body_token(token));
            position += 1;
        }
        latex
    }

    fn app_to_latex(&self, difference: &Difference, sigla: &str) -> String {
        let lemma = tokens_to_latex(&difference.reference);
        if self.config.ignored_labels.contains(difference.label()) {
            return if lemma.is_empty() {
                String::new()
            } else {
                format!("{} ", lemma)
            };
        }

        let reading = match tokens_to_latex(&difference.transcription) {
            text if text.is_empty() => "\\Omit{}".to_string(),
            text => text,
        };
        let readings = format!("\\Reading{{{}}}\\Witness{{{}}}", reading, escape_latex(sigla));
        match difference.kind {
            DifferenceKind::Addition => format!("\\Add{{{}}} ", readings),
            DifferenceKind::Omission => {
                format!("\\OmitBegin{{{}}}{}\\OmitEnd{{}} ", readings, lemma)
            }
            DifferenceKind::Transposition => {
                format!("\\TransBegin{{{}}}{}\\TransEnd{{}} ", readings, lemma)
            }
            DifferenceKind::Substitution => {
                format!("\\SubBegin{{{}}}{}\\SubEnd{{}} ", readings, lemma)
            }
        }
    }
}

impl Default for LatexEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Encoder for LatexEncoder {
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError> {
        writer.write_all(self.collation_to_latex(collation).as_bytes())?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "LaTeX"
    }

    fn file_extension(&self) -> &str {
        "tex"
    }

    fn mime_type(&self) -> &str {
        "application/x-latex"
    }
}

fn body_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Word | TokenKind::Punctuation => format!("{} ", escape_latex(&token.text)),
        TokenKind::Break(BreakKind::Open) => "\\OpenSection{}\\par\n".to_string(),
        TokenKind::Break(BreakKind::Closed) => "\\ClosedSection{} ".to_string(),
        TokenKind::Break(BreakKind::Page) => "\\par\n\\pagebreak\n".to_string(),
        TokenKind::Break(BreakKind::Song) => String::new(),
        TokenKind::Boundary(id) => match id.part {
            Part::Chapter(k) => format!("\\PreChapterSpace{{}}\\Chapter{{{}}}", k),
            Part::Verse(_, v) => format!("\\PreVerseSpace{{}}\\Verse{{{}}}", v),
            _ => String::new(),
        },
    }
}

/// Lemma or reading tokens separated by spaces
fn tokens_to_latex(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token.kind {
            TokenKind::Word | TokenKind::Punctuation => Some(escape_latex(&token.text)),
            TokenKind::Break(BreakKind::Open) => Some("\\OpenSection{}".to_string()),
            TokenKind::Break(BreakKind::Closed) => Some("\\ClosedSection{}".to_string()),
            TokenKind::Break(_) => None,
            TokenKind::Boundary(id) => match id.part {
                Part::Chapter(k) => Some(format!("\\Chapter{{{}}}", k)),
                Part::Verse(_, v) => Some(format!("\\Verse{{{}}}", v)),
                _ => None,
            },
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_latex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' => escaped.push_str("\\textasciicircum{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::Collator;
    use crate::types::{DivisionLevel, UnitId};

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
    fn test_standalone_document_with_substitution() {
        let unit = Collator::default().collate_unit(
            UnitId::verse(1, 1, 1),
            &words("a b c"),
            &words("a x c"),
        );
        let latex = LatexEncoder::new().collation_to_latex(&collation(vec![unit]));

        assert!(latex.starts_with(
            "\\documentclass{memoir}\n\\begin{document}\n\\selectlanguage{hebrew}\n\\Book{בראשית}\n"
        ));
        assert!(latex.contains(
            "\\begin{multicols*}{\\ncols}\n\\Chapter{1}\\Verse{1}a \\SubBegin{\\Reading{x}\\Witness{SR}}b\\SubEnd{} c "
        ));
        assert!(latex.ends_with("\\par\n\\end{multicols*}\n\\end{document}\n"));
    }

    #[test]
    fn test_empty_reading_is_omit() {
        let unit =
            Collator::default().collate_unit(UnitId::verse(1, 1, 1), &words("a b"), &words("a"));
        let latex = LatexEncoder::new().collation_to_latex(&collation(vec![unit]));

        assert!(latex.contains("\\OmitBegin{\\Reading{\\Omit{}}\\Witness{SR}}b\\OmitEnd{} "));
    }

    #[test]
    fn test_later_verses_get_spacing() {
        let collator = Collator::default();
        let units = vec![
            collator.collate_unit(UnitId::verse(1, 1, 1), &words("a"), &words("a")),
            collator.collate_unit(UnitId::verse(1, 1, 2), &words("b"), &words("b c")),
            collator.collate_unit(UnitId::verse(1, 2, 1), &words("d"), &words("d")),
        ];
        let latex = LatexEncoder::new().collation_to_latex(&collation(units));

        assert!(latex.contains("a \\PreVerseSpace{}\\Verse{2}b \\Add{\\Reading{c}\\Witness{SR}} "));
        assert!(latex.contains("\\PreChapterSpace{}\\Chapter{2}\\Verse{1}d "));
        assert_eq!(latex.matches("\\begin{multicols*}").count(), 1);
    }

    #[test]
    fn test_subfile_and_ignored_labels() {
        let unit = Collator::default().collate_unit(
            UnitId::verse(1, 1, 1),
            &words("a b"),
            &words("b a"),
        );
        let latex = LatexEncoder::new()
            .with_subfiles("../main/main.tex")
            .with_ignored_labels(["transposition"])
            .collation_to_latex(&collation(vec![unit]));

        assert!(latex.starts_with("\\documentclass[../main/main.tex]{subfiles}\n"));
        assert!(!latex.contains("\\TransBegin"));
        assert!(latex.contains("\\Verse{1}a b "));
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("a_b%c"), "a\\_b\\%c");
        assert_eq!(escape_latex("x\\y~"), "x\\textbackslash{}y\\textasciitilde{}");
        assert_eq!(escape_latex("שלום"), "שלום");
    }
}
