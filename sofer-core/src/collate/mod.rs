//! Collation of a transcription against the reference edition

mod align;

pub use align::{align, Site};

use crate::error::CollationError;
use crate::normalize::{strip_plene, Normalization, Normalizer};
use crate::types::{
    BoundaryPlacement, CollatedUnit, Collation, Difference, DifferenceKind, DivisionLevel,
    IssueKind, SubstitutionClass, Token, TokenKind, Unit, UnitId, UnitIssue, Witness,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Collates witnesses unit by unit
#[derive(Debug, Clone)]
pub struct Collator {
    normalization: Normalization,
    level: DivisionLevel,
    bare: Normalizer,
}

impl Collator {
    pub fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            level: DivisionLevel::default(),
            bare: Normalizer::full(),
        }
    }

    /// Record the level the witnesses were grouped at
    pub fn with_level(mut self, level: DivisionLevel) -> Self {
        self.level = level;
        self
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// Collate every reference unit against the transcription
    ///
    /// Unit-level problems are collected as issues; only a reference without units fails.
    pub fn collate(
        &self,
        reference: &Witness,
        transcription: &Witness,
    ) -> Result<Collation, CollationError> {
        if reference.units.is_empty() {
            return Err(CollationError::EmptyReference(reference.siglum.clone()));
        }

        let mut issues: Vec<UnitIssue> = reference
            .issues
            .iter()
            .chain(transcription.issues.iter())
            .cloned()
            .collect();

        let reference_units = first_occurrences(reference, &mut issues);
        let transcription_units = first_occurrences(transcription, &mut issues);
        let by_id: BTreeMap<UnitId, &Unit> =
            transcription_units.iter().map(|u| (u.id, *u)).collect();

        let mut units = Vec::with_capacity(reference_units.len());
        for unit in &reference_units {
            match by_id.get(&unit.id) {
                Some(witnessed) => {
                    units.push(self.collate_unit(unit.id, &unit.tokens, &witnessed.tokens))
                }
                None => {
                    issues.push(UnitIssue::new(
                        &transcription.siglum,
                        unit.id.to_string(),
                        IssueKind::MissingFromTranscription,
                    ));
                    units.push(CollatedUnit {
                        id: unit.id,
                        reference: self.normalization.apply_all(&unit.tokens),
                        differences: Vec::new(),
                        lacuna: true,
                    });
                }
            }
        }

        let known: HashSet<UnitId> = reference_units.iter().map(|u| u.id).collect();
        for unit in &transcription_units {
            if !known.contains(&unit.id) {
                issues.push(UnitIssue::new(
                    &transcription.siglum,
                    unit.id.to_string(),
                    IssueKind::MissingFromReference,
                ));
            }
        }

        for issue in &issues {
            warn!("{}", issue);
        }

        let collation = Collation {
            reference: reference.siglum.clone(),
            transcription: transcription.siglum.clone(),
            level: self.level,
            units,
            issues,
        };
        debug!(
            reference = %collation.reference,
            transcription = %collation.transcription,
            units = collation.units.len(),
            differences = collation.difference_count(),
            "Collation finished"
        );
        Ok(collation)
    }

    /// Collate the tokens of a single unit
    pub fn collate_unit(
        &self,
        id: UnitId,
        reference: &[Token],
        transcription: &[Token],
    ) -> CollatedUnit {
        let reference = self.normalization.apply_all(reference);
        let transcription = self.normalization.apply_all(transcription);

        let reference_keys: Vec<_> = reference.iter().map(alignment_key).collect();
        let transcription_keys: Vec<_> = transcription.iter().map(alignment_key).collect();

        let mut counters: BTreeMap<DifferenceKind, u32> = BTreeMap::new();
        let differences = align(&reference_keys, &transcription_keys)
            .into_iter()
            .map(|site| {
                let lemma = reference[site.reference.clone()].to_vec();
                let reading = transcription[site.transcription.clone()].to_vec();
                let kind = if site.transposed {
                    DifferenceKind::Transposition
                } else if lemma.is_empty() {
                    DifferenceKind::Addition
                } else if reading.is_empty() {
                    DifferenceKind::Omission
                } else {
                    DifferenceKind::Substitution
                };
                let counter = counters.entry(kind).or_insert(0);
                *counter += 1;

                Difference {
                    unit: id,
                    kind,
                    discriminator: *counter,
                    boundary: BoundaryPlacement::from_sides(
                        lemma.iter().any(Token::is_boundary),
                        reading.iter().any(Token::is_boundary),
                    ),
                    class: (kind == DifferenceKind::Substitution)
                        .then(|| self.classify(&lemma, &reading)),
                    reference_span: site.reference,
                    transcription_span: site.transcription,
                    reference: lemma,
                    transcription: reading,
                }
            })
            .collect::<Vec<_>>();

        debug!(unit = %id, differences = differences.len(), "Collated unit");

        CollatedUnit {
            id,
            reference,
            differences,
            lacuna: false,
        }
    }

    /// Grade a substitution by what survives stripping
    fn classify(&self, reference: &[Token], transcription: &[Token]) -> SubstitutionClass {
        let reference = display_text(reference);
        let transcription = display_text(transcription);

        if self.bare.normalize(&reference) == self.bare.normalize(&transcription) {
            SubstitutionClass::Vocalic
        } else if self.bare.normalize(&strip_plene(&reference))
            == self.bare.normalize(&strip_plene(&transcription))
        {
            SubstitutionClass::Orthographic
        } else {
            SubstitutionClass::Lexical
        }
    }
}

impl Default for Collator {
    fn default() -> Self {
        Self::new(Normalization::default())
    }
}

/// Tokens only match when both kind and normalized text agree
fn alignment_key(token: &Token) -> (u8, &str) {
    let kind = match token.kind {
        TokenKind::Word => 0,
        TokenKind::Punctuation => 1,
        TokenKind::Break(_) => 2,
        TokenKind::Boundary(_) => 3,
    };
    (kind, token.norm.as_str())
}

fn display_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Units in document order, reporting repeated identifiers
fn first_occurrences<'w>(witness: &'w Witness, issues: &mut Vec<UnitIssue>) -> Vec<&'w Unit> {
    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(witness.units.len());
    for unit in &witness.units {
        if seen.insert(unit.id) {
            units.push(unit);
        } else {
            issues.push(UnitIssue::new(
                &witness.siglum,
                unit.id.to_string(),
                IssueKind::DuplicateUnit,
            ));
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MarkClass;
    use crate::types::BreakKind;

    fn words(s: &str) -> Vec<Token> {
        s.split_whitespace().map(Token::word).collect()
    }

    fn witness(siglum: &str, units: &[(UnitId, &str)]) -> Witness {
        let mut witness = Witness::new(siglum);
        for (id, text) in units {
            witness.add_unit(Unit::new(*id).with_tokens(words(text)));
        }
        witness
    }

    fn kinds(unit: &CollatedUnit) -> Vec<(DifferenceKind, u32)> {
        unit.differences
            .iter()
            .map(|d| (d.kind, d.discriminator))
            .collect()
    }

    const V1: UnitId = UnitId {
        book: 1,
        part: crate::types::Part::Verse(1, 1),
    };

    #[test]
    fn test_identical_units_have_no_differences() {
        let unit = Collator::default().collate_unit(V1, &words("a b c"), &words("a b c"));
        assert!(unit.differences.is_empty());
        assert!(!unit.lacuna);
    }

    #[test]
    fn test_kinds_and_discriminators() {
        let unit =
            Collator::default().collate_unit(V1, &words("a b c d e f"), &words("a x c e f g"));
        assert_eq!(
            kinds(&unit),
            [
                (DifferenceKind::Substitution, 1),
                (DifferenceKind::Omission, 1),
                (DifferenceKind::Addition, 1),
            ]
        );
        assert_eq!(unit.differences[0].reference_span, 1..2);
        assert_eq!(unit.differences[1].reference[0].norm, "d");
        assert_eq!(unit.differences[2].transcription_span, 5..6);
    }

    #[test]
    fn test_discriminators_count_per_kind() {
        let unit = Collator::default().collate_unit(V1, &words("a b c d e"), &words("a c e"));
        assert_eq!(
            kinds(&unit),
            [(DifferenceKind::Omission, 1), (DifferenceKind::Omission, 2)]
        );
    }

    #[test]
    fn test_three_token_reordering_is_one_transposition() {
        let unit = Collator::default().collate_unit(V1, &words("a b c"), &words("b c a"));
        assert_eq!(kinds(&unit), [(DifferenceKind::Transposition, 1)]);
        assert_eq!(unit.differences[0].reference_span, 0..3);
    }

    #[test]
    fn test_adjacent_swaps_are_counted_separately() {
        let unit = Collator::default().collate_unit(V1, &words("a b c d"), &words("b a d c"));
        assert_eq!(
            kinds(&unit),
            [
                (DifferenceKind::Transposition, 1),
                (DifferenceKind::Transposition, 2)
            ]
        );
        assert_eq!(unit.differences[1].transcription_span, 2..4);
    }

    #[test]
    fn test_words_never_match_markers_with_the_same_text() {
        let boundary = Token::boundary(UnitId::verse(1, 1, 2));
        let lookalike = Token::word(boundary.text.clone());
        assert_eq!(lookalike.norm, boundary.norm);
        let unit = Collator::default().collate_unit(
            UnitId::chapter(1, 1),
            &[Token::word("a"), boundary],
            &[Token::word("a"), lookalike],
        );
        assert_eq!(kinds(&unit), [(DifferenceKind::Substitution, 1)]);
        assert_eq!(
            unit.differences[0].boundary,
            Some(BoundaryPlacement::Reference)
        );

        let open = Token::section_break(BreakKind::Open);
        let unit = Collator::default().collate_unit(
            V1,
            &[open.clone()],
            &[Token::word(open.text.clone())],
        );
        assert_eq!(kinds(&unit), [(DifferenceKind::Substitution, 1)]);
    }

    #[test]
    fn test_reconstruction_is_exact() {
        let reference = words("a b c d e f");
        let transcription = words("x a c b e f f g");
        let unit = Collator::default().collate_unit(V1, &reference, &transcription);
        let rebuilt: Vec<String> = unit
            .reconstruct_transcription()
            .into_iter()
            .map(|t| t.norm)
            .collect();
        let expected: Vec<String> = transcription.into_iter().map(|t| t.norm).collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_pointing_differences_match_under_full_strip() {
        let reference = vec![Token::word("\u{05D3}\u{05B8}\u{05D1}\u{05B8}\u{05E8}")];
        let transcription = vec![Token::word("\u{05D3}\u{05B0}\u{05D1}\u{05B7}\u{05E8}")];
        let unit = Collator::default().collate_unit(V1, &reference, &transcription);
        assert!(unit.differences.is_empty());
    }

    #[test]
    fn test_substitution_classes() {
        // Only cantillation is ignored, so vowels and spelling count
        let normalization = Normalization::new(
            Normalizer::new(),
            Normalizer::new().strip(MarkClass::Cantillation),
        );
        let collator = Collator::new(normalization);

        let vocalic = collator.collate_unit(
            V1,
            &[Token::word("\u{05D3}\u{05B8}\u{05D1}\u{05B8}\u{05E8}")],
            &[Token::word("\u{05D3}\u{05B0}\u{05D1}\u{05B7}\u{05E8}")],
        );
        assert_eq!(
            vocalic.differences[0].class,
            Some(SubstitutionClass::Vocalic)
        );
        assert_eq!(vocalic.differences[0].label(), "vocalic");

        let orthographic = collator.collate_unit(
            V1,
            &[Token::word("\u{05E9}\u{05B8}\u{05C1}\u{05DC}\u{05D5}\u{05B9}\u{05DD}")],
            &[Token::word("\u{05E9}\u{05B8}\u{05C1}\u{05DC}\u{05B9}\u{05DD}")],
        );
        assert_eq!(
            orthographic.differences[0].class,
            Some(SubstitutionClass::Orthographic)
        );

        let lexical = collator.collate_unit(V1, &words("אלהים"), &words("יהוה"));
        assert_eq!(
            lexical.differences[0].class,
            Some(SubstitutionClass::Lexical)
        );
        assert_eq!(lexical.differences[0].label(), "substitution");
    }

    #[test]
    fn test_boundary_placement() {
        let boundary = Token::boundary(UnitId::verse(1, 1, 2));
        let reference = vec![Token::word("a"), boundary.clone(), Token::word("b")];
        let transcription = vec![Token::word("a"), Token::word("b")];
        let unit = Collator::default().collate_unit(UnitId::chapter(1, 1), &reference, &transcription);

        assert_eq!(unit.differences.len(), 1);
        assert_eq!(unit.differences[0].kind, DifferenceKind::Omission);
        assert_eq!(
            unit.differences[0].boundary,
            Some(BoundaryPlacement::Reference)
        );
    }

    #[test]
    fn test_collate_reports_misaligned_units() {
        let reference = witness(
            "L",
            &[
                (UnitId::verse(1, 1, 1), "a b"),
                (UnitId::verse(1, 1, 2), "c d"),
                (UnitId::verse(1, 1, 2), "c d"),
            ],
        );
        let transcription = witness(
            "SR",
            &[
                (UnitId::verse(1, 1, 1), "a x"),
                (UnitId::verse(1, 1, 3), "e"),
            ],
        );

        let collation = Collator::default()
            .collate(&reference, &transcription)
            .unwrap();

        assert_eq!(collation.units.len(), 2);
        assert_eq!(collation.difference_count(), 1);
        assert!(collation.units[1].lacuna);

        let issues: Vec<(&str, &IssueKind)> = collation
            .issues
            .iter()
            .map(|i| (i.unit.as_str(), &i.kind))
            .collect();
        assert_eq!(
            issues,
            [
                ("B01K1V2", &IssueKind::DuplicateUnit),
                ("B01K1V2", &IssueKind::MissingFromTranscription),
                ("B01K1V3", &IssueKind::MissingFromReference),
            ]
        );
    }

    #[test]
    fn test_decoder_issues_are_carried_over() {
        let reference = witness("L", &[(UnitId::verse(1, 1, 1), "a")]);
        let mut transcription = witness("SR", &[(UnitId::verse(1, 1, 1), "a")]);
        transcription
            .issues
            .push(UnitIssue::new("SR", "B01K1Vx", IssueKind::MalformedId));

        let collation = Collator::default()
            .collate(&reference, &transcription)
            .unwrap();
        assert_eq!(collation.issues.len(), 1);
        assert_eq!(collation.issues[0].unit, "B01K1Vx");
        assert_eq!(collation.difference_count(), 0);
    }

    #[test]
    fn test_empty_reference_fails() {
        let reference = Witness::new("L");
        let transcription = witness("SR", &[(UnitId::verse(1, 1, 1), "a")]);
        assert!(matches!(
            Collator::default().collate(&reference, &transcription),
            Err(CollationError::EmptyReference(_))
        ));
    }
}
