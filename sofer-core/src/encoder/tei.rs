//! TEI XML apparatus encoder

use crate::error::RenderError;
use crate::types::{
    BreakKind, CollatedUnit, Collation, Difference, Part, Token, TokenKind, UnitIssue,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::ops::Range;

const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

/// Writes a collation as a TEI critical apparatus
///
/// Every unit with differences becomes an `<ab n>` holding one `<app>` per difference.
pub struct TeiEncoder {
    /// Spaces per indentation level, `0` for compact output
    indent: usize,
}

impl TeiEncoder {
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    fn write_collation<W: Write>(
        &self,
        writer: &mut Writer<W>,
        collation: &Collation,
    ) -> Result<(), RenderError> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("TEI");
        root.push_attribute(("xmlns", TEI_NS));
        writer.write_event(Event::Start(root))?;

        write_header(writer, collation)?;

        writer.write_event(Event::Start(BytesStart::new("text")))?;
        writer.write_event(Event::Start(BytesStart::new("body")))?;

        for unit in &collation.units {
            if unit.differences.is_empty() && !unit.lacuna {
                continue;
            }
            write_unit(writer, collation, unit)?;
        }

        if !collation.issues.is_empty() {
            write_issues(writer, &collation.issues)?;
        }

        writer.write_event(Event::End(BytesEnd::new("body")))?;
        writer.write_event(Event::End(BytesEnd::new("text")))?;
        writer.write_event(Event::End(BytesEnd::new("TEI")))?;
        Ok(())
    }
}

impl Default for TeiEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Encoder for TeiEncoder {
    fn encode(&self, collation: &Collation, writer: &mut dyn Write) -> Result<(), RenderError> {
        if self.indent == 0 {
            let mut xml = Writer::new(&mut *writer);
            self.write_collation(&mut xml, collation)?;
        } else {
            let mut xml = Writer::new_with_indent(&mut *writer, b' ', self.indent);
            self.write_collation(&mut xml, collation)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "TEI"
    }

    fn file_extension(&self) -> &str {
        "xml"
    }

    fn mime_type(&self) -> &str {
        "application/tei+xml"
    }
}

fn write_header<W: Write>(writer: &mut Writer<W>, collation: &Collation) -> Result<(), RenderError> {
    writer.write_event(Event::Start(BytesStart::new("teiHeader")))?;
    writer.write_event(Event::Start(BytesStart::new("fileDesc")))?;

    writer.write_event(Event::Start(BytesStart::new("titleStmt")))?;
    let title = format!(
        "Collation of {} against {}",
        collation.transcription, collation.reference
    );
    write_text_element(writer, BytesStart::new("title"), &title)?;
    writer.write_event(Event::End(BytesEnd::new("titleStmt")))?;

    writer.write_event(Event::Start(BytesStart::new("sourceDesc")))?;
    writer.write_event(Event::Start(BytesStart::new("listWit")))?;
    for (siglum, role) in [
        (&collation.reference, "reference"),
        (&collation.transcription, "transcription"),
    ] {
        let mut witness = BytesStart::new("witness");
        witness.push_attribute(("xml:id", siglum.as_str()));
        witness.push_attribute(("type", role));
        writer.write_event(Event::Empty(witness))?;
    }
    writer.write_event(Event::End(BytesEnd::new("listWit")))?;
    writer.write_event(Event::End(BytesEnd::new("sourceDesc")))?;

    writer.write_event(Event::End(BytesEnd::new("fileDesc")))?;

    writer.write_event(Event::Start(BytesStart::new("encodingDesc")))?;
    let mut variants = BytesStart::new("variantEncoding");
    variants.push_attribute(("method", "location-referenced"));
    variants.push_attribute(("location", "internal"));
    writer.write_event(Event::Empty(variants))?;
    writer.write_event(Event::End(BytesEnd::new("encodingDesc")))?;

    writer.write_event(Event::End(BytesEnd::new("teiHeader")))?;
    Ok(())
}

fn write_unit<W: Write>(
    writer: &mut Writer<W>,
    collation: &Collation,
    unit: &CollatedUnit,
) -> Result<(), RenderError> {
    let id = unit.id.to_string();
    let mut ab = BytesStart::new("ab");
    ab.push_attribute(("n", id.as_str()));
    if unit.lacuna {
        ab.push_attribute(("type", "lacuna"));
        writer.write_event(Event::Empty(ab))?;
        return Ok(());
    }

    writer.write_event(Event::Start(ab))?;
    for difference in &unit.differences {
        write_app(writer, collation, difference)?;
    }
    writer.write_event(Event::End(BytesEnd::new("ab")))?;
    Ok(())
}

fn write_app<W: Write>(
    writer: &mut Writer<W>,
    collation: &Collation,
    difference: &Difference,
) -> Result<(), RenderError> {
    let n = difference.discriminator.to_string();
    let loc = span(&difference.reference_span);

    let mut app = BytesStart::new("app");
    app.push_attribute(("type", difference.kind.as_str()));
    app.push_attribute(("n", n.as_str()));
    if let Some(class) = difference.class {
        app.push_attribute(("subtype", class.as_str()));
    }
    app.push_attribute(("loc", loc.as_str()));
    let boundary = difference
        .boundary
        .map(|placement| format!("#boundary-{}", placement.as_str()));
    if let Some(ana) = &boundary {
        app.push_attribute(("ana", ana.as_str()));
    }
    writer.write_event(Event::Start(app))?;

    let reference_wit = format!("#{}", collation.reference);
    let mut lem = BytesStart::new("lem");
    lem.push_attribute(("wit", reference_wit.as_str()));
    write_reading(writer, lem, "lem", &difference.reference)?;

    let transcription_wit = format!("#{}", collation.transcription);
    let transcription_loc = span(&difference.transcription_span);
    let mut rdg = BytesStart::new("rdg");
    rdg.push_attribute(("wit", transcription_wit.as_str()));
    rdg.push_attribute(("loc", transcription_loc.as_str()));
    write_reading(writer, rdg, "rdg", &difference.transcription)?;

    writer.write_event(Event::End(BytesEnd::new("app")))?;
    Ok(())
}

fn write_reading<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart,
    name: &str,
    tokens: &[Token],
) -> Result<(), RenderError> {
    if tokens.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for token in tokens {
        write_token(writer, token)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_token<W: Write>(writer: &mut Writer<W>, token: &Token) -> Result<(), RenderError> {
    match token.kind {
        TokenKind::Word => write_text_element(writer, BytesStart::new("w"), &token.text),
        TokenKind::Punctuation => write_text_element(writer, BytesStart::new("pc"), &token.text),
        TokenKind::Break(kind) => {
            let element = match kind {
                BreakKind::Open | BreakKind::Song => "lb",
                BreakKind::Closed => "space",
                BreakKind::Page => "pb",
            };
            let mut start = BytesStart::new(element);
            start.push_attribute(("type", kind.as_str()));
            writer.write_event(Event::Empty(start))?;
            Ok(())
        }
        TokenKind::Boundary(id) => {
            let unit = match (id.part, id.level()) {
                (Part::Incipit, _) => "incipit",
                (Part::Explicit, _) => "explicit",
                (_, Some(level)) => level.as_str(),
                (_, None) => "verse",
            };
            let n = id.to_string();
            let mut milestone = BytesStart::new("milestone");
            milestone.push_attribute(("unit", unit));
            milestone.push_attribute(("n", n.as_str()));
            writer.write_event(Event::Empty(milestone))?;
            Ok(())
        }
    }
}

fn write_issues<W: Write>(writer: &mut Writer<W>, issues: &[UnitIssue]) -> Result<(), RenderError> {
    let mut div = BytesStart::new("div");
    div.push_attribute(("type", "issues"));
    writer.write_event(Event::Start(div))?;
    for issue in issues {
        let mut note = BytesStart::new("note");
        note.push_attribute(("n", issue.unit.as_str()));
        note.push_attribute(("resp", format!("#{}", issue.witness).as_str()));
        write_text_element(writer, note, &issue.to_string())?;
    }
    writer.write_event(Event::End(BytesEnd::new("div")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart,
    content: &str,
) -> Result<(), RenderError> {
    let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn span(range: &Range<usize>) -> String {
    format!("{}..{}", range.start, range.end)
}
