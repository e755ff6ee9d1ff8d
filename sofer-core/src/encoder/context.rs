//! ConTeXt encoder for the edition's typesetting macros
//!
//! The reference text is set in full, with every difference wrapped in an `\App` macro:
//!
//! ```text
//! \App{label}{n}{lemma}{\Reading{reading}{sigla}}
//! ```

use crate::error::RenderError;
use crate::types::{BreakKind, CollatedUnit, Collation, Difference, Part, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

const BOOK_TITLES: [&str; 39] = [
    "בראשית",
    "שמות",
    "ויקרא",
    "במדבר",
    "דברים",
    "יהושע",
    "שפטים",
    "שמואל א",
    "שמואל ב",
    "מלכים א",
    "מלכים ב",
    "ישעיה",
    "ירמיה",
    "יחזקאל",
    "הושע",
    "יואל",
    "עמוס",
    "עבדיה",
    "יונה",
    "מיכה",
    "נחום",
    "חבקוק",
    "צפניה",
    "חגי",
    "זכריה",
    "מלאכי",
    "תהלים",
    "משלי",
    "איוב",
    "שיר השירים",
    "רות",
    "איכה",
    "קהלת",
    "אסתר",
    "דניאל",
    "עזרא",
    "נחמיה",
    "דברי הימים א",
    "דברי הימים ב",
];

/// Document-level settings for the typeset outputs
///
/// ConTeXt uses all of them. LaTeX and USFM share the sigla and ignored labels, and LaTeX
/// also takes the book titles and `subfiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Printed siglum per witness siglum; unmapped witnesses print as-is
    pub sigla: BTreeMap<String, String>,
    /// Book titles keyed by book label (`B01`)
    pub book_titles: BTreeMap<String, String>,
    /// Apparatus labels whose differences are set as plain reference text
    pub ignored_labels: BTreeSet<String>,
    /// Style environment loaded by the component
    pub environment: String,
    /// Product the component belongs to
    pub product: String,
    /// Parent document for LaTeX's subfiles class; unset means a standalone memoir document
    pub subfiles: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sigla: [("SR", "SR"), ("WLC", "L")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            book_titles: BOOK_TITLES
                .iter()
                .enumerate()
                .map(|(i, title)| (format!("B{:02}", i + 1), title.to_string()))
                .collect(),
            ignored_labels: BTreeSet::new(),
            environment: "../sty/sr-style".to_string(),
            product: "../main/main".to_string(),
            subfiles: None,
        }
    }
}

/// Writes a collation as a ConTeXt component
pub struct ContextEncoder {
    pub config: ContextConfig,
}

impl ContextEncoder {
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Add apparatus labels to set without a note (e.g. `vocalic`)
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

    /// Convert a collation to ConTeXt source
    pub fn collation_to_context(&self, collation: &Collation) -> String {
        let mut context = String::new();
        context.push_str(&format!("\\environment {}\n", self.config.environment));
        context.push_str("\\startcomponent\n");
        context.push_str(&format!("\\product {}\n", self.config.product));
        context.push_str("\\starttext\n");

        let sigla = self.siglum(&collation.transcription);
        let mut book: Option<u32> = None;
        let mut chapter: Option<u32> = None;

        for unit in &collation.units {
            if book != Some(unit.id.book) {
                if book.is_some() {
                    context.push_str(BOOK_END);
                }
                book = Some(unit.id.book);
                chapter = None;
                context.push_str(&self.book_start(unit.id.book));
            }

            match unit.id.part {
                Part::Chapter(k) | Part::Verse(k, _) if chapter != Some(k) => {
                    chapter = Some(k);
                    context.push_str(&format!("\n\\Chapter{{{}}}", k));
                }
                _ => {}
            }
            if let Part::Verse(_, v) = unit.id.part {
                context.push_str(&format!("\n\\Verse{{{}}}", v));
            }

            context.push_str(&self.unit_to_context(unit, sigla));
        }
        if book.is_some() {
            context.push_str(BOOK_END);
        }

        context.push_str("\\stoptext\n");
        for issue in &collation.issues {
            context.push_str(&format!("% {}\n", issue));
        }
        context.push_str("\\stopcomponent\n");
        context
    }

    fn book_start(&self, book: u32) -> String {
        let mut context = match self.config.book_titles.get(&format!("B{:02}", book)) {
            Some(title) => format!("\\startBook[title={{{}}}]\n", escape_context(title)),
            None => "\\startBook\n".to_string(),
        };
        context.push_str("\\startpagecolumns[hebrew]\n");
        context
    }

    /// Reference text of one unit with its apparatus entries
    fn unit_to_context(&self, unit: &CollatedUnit, sigla: &str) -> String {
        let mut context = String::new();
        let mut differences = unit.differences.iter().peekable();
        let mut position = 0;

        loop {
            if let Some(difference) =
                differences.next_if(|d| d.reference_span.start == position)
            {
                context.push_str(&self.app_to_context(difference, sigla));
                position = difference.reference_span.end;
                continue;
            }
            let Some(token) = unit.reference.get(position) else {
                break;
            };
            context.push_str(&body_token(token));
            position += 1;
        }
        context
    }

    fn app_to_context(&self, difference: &Difference, sigla: &str) -> String {
        let label = difference.label();
        let lemma = reading_to_context(&difference.reference, Placement::Lemma);
        if self.config.ignored_labels.contains(label) {
            return if lemma.is_empty() {
                String::new()
            } else {
                format!("{} ", lemma)
            };
        }

        let reading = reading_to_context(&difference.transcription, Placement::Reading);
        format!(
            "\\App{{{}}}{{{}}}{{{}}}{{\\Reading{{{}}}{{{}}}}} ",
            label,
            difference.discriminator,
            lemma,
            reading,
            escape_context(sigla)
        )
    }
}

const BOOK_END: &str = "\n\\page[no]\n\\stoppagecolumns\n\\stopBook\n";

impl Default for ContextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Encoder for ContextEncoder {
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError> {
        let context = self.collation_to_context(collation);
        writer.write_all(context.as_bytes())?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "ConTeXt"
    }

    fn file_extension(&self) -> &str {
        "tex"
    }

    fn mime_type(&self) -> &str {
        "text/x-tex"
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Placement {
    Lemma,
    Reading,
}

/// A token in running text
fn body_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Word | TokenKind::Punctuation => format!("{} ", escape_context(&token.text)),
        TokenKind::Break(BreakKind::Open) => "\\OpenSection ".to_string(),
        TokenKind::Break(BreakKind::Closed) => "\\ClosedSection ".to_string(),
        TokenKind::Break(BreakKind::Page) => "\n\\page\n".to_string(),
        TokenKind::Break(BreakKind::Song) => String::new(),
        TokenKind::Boundary(id) => match id.part {
            Part::Chapter(k) => format!("\n\\Chapter{{{}}}", k),
            Part::Verse(_, v) => format!("\n\\Verse{{{}}}", v),
            _ => String::new(),
        },
    }
}

/// Tokens inside a lemma or reading, without trailing space
fn reading_to_context(tokens: &[Token], placement: Placement) -> String {
    let prefix = match placement {
        Placement::Lemma => "",
        Placement::Reading => "Rdg",
    };
    let mut context = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let last = i + 1 == tokens.len();
        let piece = match token.kind {
            TokenKind::Word | TokenKind::Punctuation => escape_context(&token.text),
            TokenKind::Break(BreakKind::Open) => format!("\\{}OpenSection", prefix),
            TokenKind::Break(BreakKind::Closed) => format!("\\{}ClosedSection", prefix),
            TokenKind::Break(_) => continue,
            TokenKind::Boundary(id) => match id.part {
                Part::Chapter(k) => format!("\\{}Chapter{{{}}}", prefix, k),
                Part::Verse(_, v) if last => format!("\\{}Verse{{{}}}\\nospace", prefix, v),
                Part::Verse(_, v) => format!("\\{}Verse{{{}}}", prefix, v),
                _ => continue,
            },
        };
        context.push_str(&piece);
        if !last && !matches!(token.kind, TokenKind::Boundary(_)) {
            context.push(' ');
        }
    }
    context
}

/// Escape ConTeXt special characters
fn escape_context(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\backslash "),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' => escaped.push_str("\\^{}"),
            '~' => escaped.push_str("\\lettertilde "),
            _ => escaped.push(c),
        }
    }
    escaped
}
