//! Core types shared by the decoders, the collator and the encoders

mod collation;
mod difference;
mod token;
mod unit;
mod witness;

pub use collation::{CollatedUnit, Collation, IssueKind, UnitIssue};
pub use difference::{BoundaryPlacement, Difference, DifferenceKind, SubstitutionClass};
pub use token::{BreakKind, Token, TokenKind};
pub use unit::{DivisionLevel, Part, UnitId};
pub use witness::{Unit, Witness};
