//! End-to-end tests for sofer-core
//!
//! Both witnesses are decoded from TEI, collated and written out with every encoder.

use sofer_core::collate::Collator;
use sofer_core::decoder::{Decoder, PlainDecoder, TeiDecoder};
use sofer_core::encoder::encoder_for_format;
use sofer_core::types::{
    BoundaryPlacement, Collation, DifferenceKind, DivisionLevel, IssueKind, SubstitutionClass,
    UnitId, Witness,
};
use std::io::Cursor;

// =============================================================================
// Fixtures
// =============================================================================

const OR_PLENE: &str = "\u{05D0}\u{05D5}\u{05B9}\u{05E8}";
const OR_DEFECTIVE: &str = "\u{05D0}\u{05B9}\u{05E8}";

fn tei(siglum: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc><titleStmt>
    <title>Genesis</title>
    <title type="document" n="{}">Witness</title>
  </titleStmt></fileDesc></teiHeader>
  <text><body>{}</body></text>
</TEI>"#,
        siglum, body
    )
}

fn reference() -> Witness {
    let body = format!(
        r#"<milestone unit="verse" n="B01K1V1"/><w>בְּרֵאשִׁ֖ית</w><w>בָּרָ֣א</w><w>אֱלֹהִ֑ים</w><pc>׃</pc>
           <milestone unit="verse" n="B01K1V2"/><w>תֹ֙הוּ֙</w><w>וָבֹ֔הוּ</w><pc>׃</pc>
           <milestone unit="verse" n="B01K1V3"/><w>יְהִ֣י</w><w>{}</w><pc>׃</pc>
           <milestone unit="verse" n="B01K1V4"/><w>וַיַּ֧רְא</w>"#,
        OR_PLENE
    );
    TeiDecoder::new()
        .decode_str(&tei("WLC", &body))
        .expect("reference decodes")
}

fn transcription() -> Witness {
    let body = format!(
        r#"<milestone unit="verse" n="B01K1V1"/><w>בְּרֵאשִׁית</w><w>בָּרָא</w><w>אֱלֹהִים</w><pc>׃</pc>
           <milestone unit="verse" n="B01K1V2"/><w>וָבֹהוּ</w><w>תֹהוּ</w><pc>׃</pc>
           <milestone unit="verse" n="B01K1Vx"/><w>חֹשֶׁךְ</w>
           <milestone unit="verse" n="B01K1V3"/><w>יְהִי</w><w>{}</w><pc>׃</pc>"#,
        OR_DEFECTIVE
    );
    TeiDecoder::new()
        .decode_str(&tei("SR", &body))
        .expect("transcription decodes")
}

fn collation() -> Collation {
    Collator::default()
        .collate(&reference(), &transcription())
        .expect("collation succeeds")
}

fn summary(collation: &Collation) -> String {
    let mut lines = Vec::new();
    for unit in &collation.units {
        if unit.lacuna {
            lines.push(format!("{} lacuna", unit.id));
        }
        for d in &unit.differences {
            lines.push(format!(
                "{} {}{} {}..{} {}..{}",
                d.unit,
                d.label(),
                d.discriminator,
                d.reference_span.start,
                d.reference_span.end,
                d.transcription_span.start,
                d.transcription_span.end
            ));
        }
    }
    lines.join("\n")
}

// =============================================================================
// Collation
// =============================================================================

#[test]
fn test_differences_per_unit() {
    let collation = collation();

    assert_eq!(collation.reference, "WLC");
    assert_eq!(collation.transcription, "SR");
    assert_eq!(collation.units.len(), 4);

    assert!(collation.units[0].differences.is_empty());

    let v2 = &collation.units[1].differences;
    assert_eq!(v2.len(), 1);
    assert_eq!(v2[0].kind, DifferenceKind::Transposition);

    let v3 = &collation.units[2].differences;
    assert_eq!(v3.len(), 1);
    assert_eq!(v3[0].kind, DifferenceKind::Substitution);
    assert_eq!(v3[0].class, Some(SubstitutionClass::Orthographic));

    assert!(collation.units[3].lacuna);
}

#[test]
fn test_summary_snapshot() {
    insta::assert_snapshot!(summary(&collation()), @r"
    B01K1V2 transposition1 0..2 0..2
    B01K1V3 orthographic1 1..2 1..2
    B01K1V4 lacuna
    ");
}

#[test]
fn test_bad_units_do_not_stop_collation() {
    let collation = collation();

    assert!(collation
        .issues
        .iter()
        .any(|i| i.witness == "SR" && i.unit == "B01K1Vx" && i.kind == IssueKind::MalformedId));
    assert!(collation
        .issues
        .iter()
        .any(|i| i.unit == "B01K1V4" && i.kind == IssueKind::MissingFromTranscription));
    assert_eq!(collation.units[2].id, UnitId::verse(1, 1, 3));
}

#[test]
fn test_reconstruction_matches_transcription() {
    let collation = collation();
    let transcription = transcription();
    let collator = Collator::default();

    for unit in collation.units.iter().filter(|u| !u.lacuna) {
        let expected: Vec<String> = collator
            .normalization()
            .apply_all(&transcription.unit(&unit.id).unwrap().tokens)
            .into_iter()
            .map(|t| t.norm)
            .collect();
        let rebuilt: Vec<String> = unit
            .reconstruct_transcription()
            .into_iter()
            .map(|t| t.norm)
            .collect();
        assert_eq!(rebuilt, expected, "unit {}", unit.id);
    }
}

#[test]
fn test_moved_verse_boundary_at_chapter_level() {
    let decoder = TeiDecoder::new().with_level(DivisionLevel::Chapter);
    let reference = decoder
        .decode_str(&tei(
            "WLC",
            r#"<milestone unit="chapter" n="B01K1"/>
               <milestone unit="verse" n="B01K1V1"/><w>a</w><w>b</w>
               <milestone unit="verse" n="B01K1V2"/><w>c</w><w>d</w>"#,
        ))
        .unwrap();
    let transcription = decoder
        .decode_str(&tei(
            "SR",
            r#"<milestone unit="chapter" n="B01K1"/>
               <milestone unit="verse" n="B01K1V1"/><w>a</w><w>b</w><w>c</w>
               <milestone unit="verse" n="B01K1V2"/><w>d</w>"#,
        ))
        .unwrap();

    let collation = Collator::default()
        .with_level(DivisionLevel::Chapter)
        .collate(&reference, &transcription)
        .unwrap();
    let differences: Vec<_> = collation.differences().collect();

    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].kind, DifferenceKind::Transposition);
    assert_eq!(differences[0].boundary, Some(BoundaryPlacement::Both));
}

#[test]
fn test_plain_and_tei_witnesses_collate_alike() {
    let plain = PlainDecoder::new()
        .decode(&mut Cursor::new(
            "@siglum SR\nB01K1V1 בְּרֵאשִׁית בָּרָא אֱלֹהִים׃\nB01K1V2 וָבֹהוּ תֹהוּ׃\n",
        ))
        .unwrap();
    let collator = Collator::default();
    let from_plain = collator.collate(&reference(), &plain).unwrap();
    let from_tei = collator.collate(&reference(), &transcription()).unwrap();

    assert_eq!(from_plain.units[0], from_tei.units[0]);
    assert_eq!(from_plain.units[1], from_tei.units[1]);
}

// =============================================================================
// Output
// =============================================================================

fn render(format: &str, collation: &Collation) -> String {
    let encoder = encoder_for_format(format).expect("known format");
    let mut out = Vec::new();
    encoder.encode(collation, &mut out).expect("encodes");
    String::from_utf8(out).expect("utf-8 output")
}

#[test]
fn test_tei_apparatus() {
    let xml = render("tei", &collation());

    assert!(xml.contains(r#"<ab n="B01K1V2">"#));
    assert!(xml.contains(r#"type="transposition""#));
    assert!(xml.contains(r#"subtype="orthographic""#));
    assert!(xml.contains(r#"<ab n="B01K1V4" type="lacuna"/>"#));
    assert!(xml.contains(r#"<div type="issues">"#));
    assert!(!xml.contains(r#"<ab n="B01K1V1""#));
}

#[test]
fn test_context_apparatus() {
    let tex = render("context", &collation());

    assert!(tex.contains("\\App{transposition}{1}{"));
    assert!(tex.contains("\\App{orthographic}{1}{"));
    assert!(tex.contains("{\\Reading{"));
    assert!(tex.contains("}{SR}} "));
    assert!(tex.contains("% SR: malformed unit identifier 'B01K1Vx'"));
}

#[test]
fn test_json_output_round_trips() {
    let collation = collation();
    let json = render("json", &collation);
    let back: Collation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, collation);
}
