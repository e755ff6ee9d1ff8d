//! Sofer Core Library
//!
//! Collation tooling for a critical edition of the Hebrew Bible. Transcriptions and the
//! reference edition are decoded into witnesses of tokens grouped by addressable unit, both
//! sides are normalized, and every unit is aligned to produce apparatus entries that the
//! encoders write out as TEI, ConTeXt or JSON.

pub mod bibliography;
pub mod collate;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod lint;
pub mod normalize;
pub mod rewrite;
pub mod types;

pub use bibliography::{BibliographySpec, FieldSet};
pub use collate::Collator;
pub use config::SoferConfig;
pub use error::{CollationError, ConfigError, ParseError, RenderError, Result, SoferError};
pub use normalize::{MarkClass, Normalization, Normalizer, SpellingScheme, SpellingTable};
pub use types::{
    BoundaryPlacement, BreakKind, CollatedUnit, Collation, Difference, DifferenceKind,
    DivisionLevel, IssueKind, SubstitutionClass, Token, TokenKind, Unit, UnitId, UnitIssue,
    Witness,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collate_plain_witnesses() {
        let reference = decoder::PlainDecoder::new()
            .decode_str("@siglum WLC\nB01K1V1 a b c\n")
            .unwrap();
        let transcription = decoder::PlainDecoder::new()
            .decode_str("@siglum SR\nB01K1V1 a c\n")
            .unwrap();

        let collation = Collator::default()
            .collate(&reference, &transcription)
            .unwrap();
        assert_eq!(collation.difference_count(), 1);
        assert_eq!(collation.units[0].differences[0].kind, DifferenceKind::Omission);
    }
}
