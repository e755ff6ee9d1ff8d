//! Rewriting TEI transcriptions in place

use crate::error::ParseError;
use crate::normalize::Normalizer;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Re-serialize a TEI document with the text of every `<w>` normalized
///
/// Markup, attributes, comments and all other text are written back as read.
pub fn normalize_document(xml: &str, normalizer: &Normalizer) -> Result<String, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut word_depth = 0usize;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                if word_depth > 0 || e.local_name().as_ref() == b"w" {
                    word_depth += 1;
                }
                writer.write_event(event)?;
            }
            Event::End(_) => {
                word_depth = word_depth.saturating_sub(1);
                writer.write_event(event)?;
            }
            Event::Text(ref t) if word_depth > 0 => {
                let normalized = normalizer.normalize(&t.unescape()?);
                writer.write_event(Event::Text(BytesText::new(&normalized)))?;
            }
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ParseError::MalformedContent(e.to_string()))
}
