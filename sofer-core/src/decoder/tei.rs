//! TEI XML transcription decoder

use crate::error::ParseError;
use crate::types::{
    BreakKind, DivisionLevel, IssueKind, Token, Unit, UnitId, UnitIssue, Witness,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::Read;

/// Decoder for TEI XML transcriptions
///
/// Units are delimited by `<milestone unit n/>` elements or by `<div type n>` and `<ab n>`
/// containers. Divisions finer than the collation level are kept as boundary tokens.
#[derive(Debug, Clone)]
pub struct TeiDecoder {
    level: DivisionLevel,
    ignored_tags: BTreeSet<String>,
    /// `rdg/@type` to prefer inside `<app>`
    reading_type: Option<String>,
    ignore_punctuation: bool,
    ignore_breaks: bool,
    siglum: Option<String>,
}

impl TeiDecoder {
    pub fn new() -> Self {
        Self {
            level: DivisionLevel::default(),
            ignored_tags: BTreeSet::new(),
            reading_type: None,
            ignore_punctuation: false,
            ignore_breaks: false,
            siglum: None,
        }
    }

    /// Set the division level units are grouped at
    pub fn with_level(mut self, level: DivisionLevel) -> Self {
        self.level = level;
        self
    }

    /// Skip elements with these local names, subtree included
    pub fn with_ignored_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_reading_type(mut self, reading_type: impl Into<String>) -> Self {
        self.reading_type = Some(reading_type.into());
        self
    }

    pub fn with_ignore_punctuation(mut self, ignore: bool) -> Self {
        self.ignore_punctuation = ignore;
        self
    }

    pub fn with_ignore_breaks(mut self, ignore: bool) -> Self {
        self.ignore_breaks = ignore;
        self
    }

    /// Use this siglum instead of the one in the document's titles
    pub fn with_siglum(mut self, siglum: impl Into<String>) -> Self {
        self.siglum = Some(siglum.into());
        self
    }

    pub fn level(&self) -> DivisionLevel {
        self.level
    }

    /// Decode a document held in memory
    pub fn decode_str(&self, xml: &str) -> Result<Witness, ParseError> {
        let mut reader = Reader::from_str(xml);
        let mut state = DecodeState::new(self);
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = local_name(&e);
                    if self.ignored_tags.contains(&name) {
                        reader.read_to_end(e.name())?;
                        continue;
                    }
                    let frame = state.open(&name, &e)?;
                    stack.push(frame);
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    if self.ignored_tags.contains(&name) {
                        continue;
                    }
                    let frame = state.open(&name, &e)?;
                    state.close(frame);
                }
                Event::End(_) => {
                    if let Some(frame) = stack.pop() {
                        state.close(frame);
                    }
                }
                Event::Text(t) => append_text(&mut stack, &t.unescape()?),
                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    append_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        state.finish()
    }

    /// Decode one witness per distinct reading type, e.g. ketiv and qere
    ///
    /// Each witness takes the siglum `{siglum}-{type}`. A document without typed readings
    /// yields a single witness under its own siglum.
    pub fn decode_readings(&self, xml: &str) -> Result<Vec<Witness>, ParseError> {
        let types = reading_types(xml)?;
        if types.is_empty() {
            return Ok(vec![self.decode_str(xml)?]);
        }

        types
            .into_iter()
            .map(|reading_type| {
                let mut witness = self
                    .clone()
                    .with_reading_type(reading_type.clone())
                    .decode_str(xml)?;
                witness.siglum = format!("{}-{}", witness.siglum, reading_type);
                for issue in &mut witness.issues {
                    issue.witness = witness.siglum.clone();
                }
                Ok(witness)
            })
            .collect()
    }
}

impl Default for TeiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Decoder for TeiDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<Witness, ParseError> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        self.decode_str(&xml)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["xml", "tei"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["application/tei+xml", "application/xml", "text/xml"]
    }
}

/// Distinct `rdg/@type` values in document order
pub fn reading_types(xml: &str) -> Result<Vec<String>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut types: Vec<String> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e) == "rdg" => {
                if let Some(kind) = attribute(&e, "type")? {
                    if !types.contains(&kind) {
                        types.push(kind);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(types)
}

/// An open element, popped when its end tag arrives
enum Frame {
    Other,
    Body,
    Title {
        document: bool,
        n: Option<String>,
        text: String,
    },
    App,
    Reading,
    Word(String),
    Punctuation(String),
}

/// One `<lem>` or `<rdg>` buffered until its `<app>` closes
struct ReadingBuffer {
    lemma: bool,
    kind: Option<String>,
    tokens: Vec<Token>,
}

#[derive(Default)]
struct AppBuffer {
    readings: Vec<ReadingBuffer>,
    active: Option<usize>,
}

struct OpenUnit {
    id: UnitId,
    tokens: Vec<Token>,
    rejected: bool,
}

struct DecodeState<'d> {
    decoder: &'d TeiDecoder,
    titles: Vec<(bool, String)>,
    seen_body: bool,
    in_body: bool,
    apps: Vec<AppBuffer>,
    current: Option<OpenUnit>,
    units: Vec<Unit>,
    issues: Vec<UnitIssue>,
}

impl<'d> DecodeState<'d> {
    fn new(decoder: &'d TeiDecoder) -> Self {
        Self {
            decoder,
            titles: Vec::new(),
            seen_body: false,
            in_body: false,
            apps: Vec::new(),
            current: None,
            units: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn open(&mut self, name: &str, e: &BytesStart) -> Result<Frame, ParseError> {
        let frame = match name {
            "title" => Frame::Title {
                document: attribute(e, "type")?.as_deref() == Some("document"),
                n: attribute(e, "n")?,
                text: String::new(),
            },
            "body" => {
                self.seen_body = true;
                self.in_body = true;
                Frame::Body
            }
            "milestone" if self.in_body => {
                if let Some(unit) = attribute(e, "unit")? {
                    self.division(&unit, attribute(e, "n")?);
                }
                Frame::Other
            }
            "div" if self.in_body => {
                if let Some(kind) = attribute(e, "type")? {
                    self.division(&kind, attribute(e, "n")?);
                }
                Frame::Other
            }
            "ab" if self.in_body => {
                if let Some(n) = attribute(e, "n")? {
                    self.division("verse", Some(n));
                }
                Frame::Other
            }
            "app" => {
                self.apps.push(AppBuffer::default());
                Frame::App
            }
            "lem" | "rdg" => match self.apps.last_mut() {
                Some(app) => {
                    app.readings.push(ReadingBuffer {
                        lemma: name == "lem",
                        kind: attribute(e, "type")?,
                        tokens: Vec::new(),
                    });
                    app.active = Some(app.readings.len() - 1);
                    Frame::Reading
                }
                None => Frame::Other,
            },
            "w" => Frame::Word(String::new()),
            "pc" => Frame::Punctuation(String::new()),
            "lb" | "space" | "cb" | "pb" => {
                let kind = attribute(e, "type")?.and_then(|t| BreakKind::from_type(&t));
                if let Some(kind) = kind {
                    if !self.decoder.ignore_breaks {
                        self.push_token(Token::section_break(kind));
                    }
                }
                Frame::Other
            }
            _ => Frame::Other,
        };
        Ok(frame)
    }

    fn close(&mut self, frame: Frame) {
        match frame {
            Frame::Other => {}
            Frame::Body => self.in_body = false,
            Frame::Title { document, n, text } => {
                let value = n.unwrap_or_else(|| text.trim().to_string());
                self.titles.push((document, value));
            }
            Frame::App => {
                if let Some(app) = self.apps.pop() {
                    for token in self.choose_reading(app) {
                        self.push_token(token);
                    }
                }
            }
            Frame::Reading => {
                if let Some(app) = self.apps.last_mut() {
                    app.active = None;
                }
            }
            Frame::Word(text) => match text.trim() {
                "" => self.reject_current("empty word"),
                word => self.push_token(Token::word(word)),
            },
            Frame::Punctuation(text) => {
                if self.decoder.ignore_punctuation {
                    return;
                }
                match text.trim() {
                    "" => self.reject_current("empty punctuation"),
                    mark => self.push_token(Token::punctuation(mark)),
                }
            }
        }
    }

    fn choose_reading(&self, app: AppBuffer) -> Vec<Token> {
        let mut readings = app.readings;
        let preferred = self.decoder.reading_type.as_deref().and_then(|wanted| {
            readings
                .iter()
                .position(|r| !r.lemma && r.kind.as_deref() == Some(wanted))
        });
        let index = preferred
            .or_else(|| readings.iter().position(|r| r.lemma))
            .or(if readings.is_empty() { None } else { Some(0) });
        match index {
            Some(i) => readings.swap_remove(i).tokens,
            None => Vec::new(),
        }
    }

    /// Handle a division marker of the given kind
    fn division(&mut self, unit: &str, n: Option<String>) {
        let rank = match unit {
            "incipit" | "explicit" => Ordering::Equal,
            other => match other.parse::<DivisionLevel>() {
                Ok(level) => level.cmp(&self.decoder.level),
                // Not a division we address (e.g. a line or section)
                Err(_) => return,
            },
        };
        let (n, parsed) = match n {
            Some(n) => {
                let parsed = UnitId::parse_division(unit, &n);
                (n, parsed)
            }
            None => {
                let n = self.missing_id_label(unit);
                let parsed = UnitId::parse_division(unit, "");
                (n, parsed)
            }
        };

        match (rank, parsed) {
            (Ordering::Equal, Ok(id)) => {
                self.finish_unit();
                self.current = Some(OpenUnit {
                    id,
                    tokens: Vec::new(),
                    rejected: false,
                });
            }
            (Ordering::Equal, Err(_)) => {
                self.issue(&n, IssueKind::MalformedId);
                self.finish_unit();
            }
            (Ordering::Less, parsed) => {
                if parsed.is_err() {
                    self.issue(&n, IssueKind::MalformedId);
                }
                self.finish_unit();
            }
            (Ordering::Greater, Ok(id)) => self.push_token(Token::boundary(id)),
            (Ordering::Greater, Err(_)) => {
                self.issue(&n, IssueKind::MalformedId);
                if let Some(current) = self.current.as_mut() {
                    current.rejected = true;
                }
            }
        }
    }

    /// Stand-in for a division without `n`, placed after the last unit seen
    fn missing_id_label(&self, unit: &str) -> String {
        let last = self
            .current
            .as_ref()
            .map(|open| open.id)
            .or_else(|| self.units.last().map(|u| u.id));
        match last {
            Some(id) => format!("{} without n after {}", unit, id),
            None => format!("{} without n before the first unit", unit),
        }
    }

    fn push_token(&mut self, token: Token) {
        if let Some(app) = self.apps.last_mut() {
            if let Some(active) = app.active {
                app.readings[active].tokens.push(token);
            }
            return;
        }
        if let Some(current) = self.current.as_mut() {
            if !current.rejected {
                current.tokens.push(token);
            }
        }
    }

    fn reject_current(&mut self, detail: &str) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if current.rejected {
            return;
        }
        current.rejected = true;
        let unit = current.id.to_string();
        self.issue(&unit, IssueKind::UnparseableToken(detail.to_string()));
    }

    fn issue(&mut self, unit: &str, kind: IssueKind) {
        // The witness is filled in once the siglum is known
        self.issues.push(UnitIssue::new(String::new(), unit, kind));
    }

    fn finish_unit(&mut self) {
        if let Some(open) = self.current.take() {
            if !open.rejected {
                self.units.push(Unit::new(open.id).with_tokens(open.tokens));
            }
        }
    }

    fn finish(mut self) -> Result<Witness, ParseError> {
        self.finish_unit();
        if !self.seen_body {
            return Err(ParseError::MissingField("body".to_string()));
        }

        let siglum = match &self.decoder.siglum {
            Some(siglum) => siglum.clone(),
            None => self
                .titles
                .iter()
                .find(|(document, _)| *document)
                .or_else(|| self.titles.get(1))
                .map(|(_, value)| value.clone())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ParseError::MissingField("witness title".to_string()))?,
        };

        let mut witness = Witness::new(siglum);
        witness.units = self.units;
        witness.issues = self.issues;
        for issue in &mut witness.issues {
            issue.witness = witness.siglum.clone();
        }
        Ok(witness)
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Append character data to the innermost element that collects text
fn append_text(stack: &mut [Frame], text: &str) {
    for frame in stack.iter_mut().rev() {
        match frame {
            Frame::Word(buffer) | Frame::Punctuation(buffer) => {
                buffer.push_str(text);
                return;
            }
            Frame::Title { text: buffer, .. } => {
                buffer.push_str(text);
                return;
            }
            Frame::App | Frame::Reading | Frame::Body => return,
            Frame::Other => {}
        }
    }
}
