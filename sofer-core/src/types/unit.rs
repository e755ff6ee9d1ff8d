//! Addressable units of the text and the levels they are grouped at

use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

static UNIT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^B(\d+)(?:K(\d+)(?:V(\d+))?|(incipit|explicit))?$").expect("unit id pattern")
});

static BOOK_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^B(\d+)").expect("book prefix"));

/// Position of a unit within its book
///
/// Parts order as they occur in the text: a chapter comes right before its own verses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The book as a whole
    Whole,
    Incipit,
    Chapter(u32),
    Verse(u32, u32),
    Explicit,
}

impl Part {
    fn sort_key(&self) -> (u8, u32, Option<u32>) {
        match *self {
            Part::Whole => (0, 0, None),
            Part::Incipit => (1, 0, None),
            Part::Chapter(k) => (2, k, None),
            Part::Verse(k, v) => (2, k, Some(v)),
            Part::Explicit => (3, 0, None),
        }
    }
}

impl Ord for Part {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Identifier of an addressable unit, e.g. `B01K1V1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId {
    pub book: u32,
    pub part: Part,
}

impl UnitId {
    pub fn book(book: u32) -> Self {
        Self {
            book,
            part: Part::Whole,
        }
    }

    pub fn chapter(book: u32, chapter: u32) -> Self {
        Self {
            book,
            part: Part::Chapter(chapter),
        }
    }

    pub fn verse(book: u32, chapter: u32, verse: u32) -> Self {
        Self {
            book,
            part: Part::Verse(chapter, verse),
        }
    }

    pub fn incipit(book: u32) -> Self {
        Self {
            book,
            part: Part::Incipit,
        }
    }

    pub fn explicit(book: u32) -> Self {
        Self {
            book,
            part: Part::Explicit,
        }
    }

    /// Chapter number, if this unit lies inside a chapter
    pub fn chapter_number(&self) -> Option<u32> {
        match self.part {
            Part::Chapter(k) | Part::Verse(k, _) => Some(k),
            _ => None,
        }
    }

    /// Verse number, if this is a verse
    pub fn verse_number(&self) -> Option<u32> {
        match self.part {
            Part::Verse(_, v) => Some(v),
            _ => None,
        }
    }

    /// The division level this identifier addresses
    ///
    /// Incipits and explicits stand in for chapters and verses alike, so they report `None`.
    pub fn level(&self) -> Option<DivisionLevel> {
        match self.part {
            Part::Whole => Some(DivisionLevel::Book),
            Part::Chapter(_) => Some(DivisionLevel::Chapter),
            Part::Verse(..) => Some(DivisionLevel::Verse),
            Part::Incipit | Part::Explicit => None,
        }
    }

    /// Parse the `n` attribute of a division element of the given kind
    ///
    /// Incipit and explicit divisions only need a leading book number (`B01`, `B01incipit`).
    pub fn parse_division(unit: &str, n: &str) -> Result<Self, ParseError> {
        match unit {
            "incipit" | "explicit" => {
                let book = BOOK_PREFIX_RE
                    .captures(n)
                    .and_then(|c| c[1].parse().ok())
                    .ok_or_else(|| ParseError::MalformedUnitId(n.to_string()))?;
                Ok(if unit == "incipit" {
                    Self::incipit(book)
                } else {
                    Self::explicit(book)
                })
            }
            _ => {
                let id: UnitId = n.parse()?;
                let expected: DivisionLevel = unit.parse()?;
                if id.level() != Some(expected) {
                    return Err(ParseError::MalformedUnitId(n.to_string()));
                }
                Ok(id)
            }
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            Part::Whole => write!(f, "B{:02}", self.book),
            Part::Incipit => write!(f, "B{:02}incipit", self.book),
            Part::Chapter(k) => write!(f, "B{:02}K{}", self.book, k),
            Part::Verse(k, v) => write!(f, "B{:02}K{}V{}", self.book, k, v),
            Part::Explicit => write!(f, "B{:02}explicit", self.book),
        }
    }
}

impl FromStr for UnitId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedUnitId(s.to_string());
        let caps = UNIT_ID_RE.captures(s.trim()).ok_or_else(malformed)?;
        let number = |i: usize| -> Result<Option<u32>, ParseError> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| malformed()))
                .transpose()
        };

        let book = number(1)?.ok_or_else(malformed)?;
        let part = match (number(2)?, number(3)?, caps.get(4).map(|m| m.as_str())) {
            (None, None, None) => Part::Whole,
            (Some(k), None, None) => Part::Chapter(k),
            (Some(k), Some(v), None) => Part::Verse(k, v),
            (None, None, Some("incipit")) => Part::Incipit,
            (None, None, Some(_)) => Part::Explicit,
            _ => return Err(malformed()),
        };
        Ok(Self { book, part })
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Textual division level at which tokens are grouped for collation
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DivisionLevel {
    Book,
    Chapter,
    #[default]
    Verse,
}

impl DivisionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DivisionLevel::Book => "book",
            DivisionLevel::Chapter => "chapter",
            DivisionLevel::Verse => "verse",
        }
    }
}

impl fmt::Display for DivisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DivisionLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "book" => Ok(DivisionLevel::Book),
            "chapter" => Ok(DivisionLevel::Chapter),
            "verse" => Ok(DivisionLevel::Verse),
            _ => Err(ParseError::UnknownLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verse() {
        let id: UnitId = "B01K1V1".parse().unwrap();
        assert_eq!(id, UnitId::verse(1, 1, 1));
        assert_eq!(id.to_string(), "B01K1V1");
        assert_eq!(id.level(), Some(DivisionLevel::Verse));
    }

    #[test]
    fn test_parse_chapter_and_book() {
        assert_eq!("B12K40".parse::<UnitId>().unwrap(), UnitId::chapter(12, 40));
        assert_eq!("B05".parse::<UnitId>().unwrap(), UnitId::book(5));
        assert_eq!(UnitId::book(5).to_string(), "B05");
    }

    #[test]
    fn test_parse_incipit_explicit() {
        assert_eq!("B01incipit".parse::<UnitId>().unwrap(), UnitId::incipit(1));
        assert_eq!("B39explicit".parse::<UnitId>().unwrap(), UnitId::explicit(39));
    }

    #[test]
    fn test_malformed_ids() {
        for bad in ["", "K1V1", "B01V1", "B01K", "Genesis 1:1", "B01K1V1x"] {
            assert!(
                matches!(bad.parse::<UnitId>(), Err(ParseError::MalformedUnitId(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_ordering_follows_text() {
        let mut ids = vec![
            UnitId::explicit(1),
            UnitId::verse(1, 2, 1),
            UnitId::verse(1, 1, 10),
            UnitId::incipit(1),
            UnitId::verse(1, 1, 2),
        ];
        ids.sort();
        let labels: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(
            labels,
            ["B01incipit", "B01K1V2", "B01K1V10", "B01K2V1", "B01explicit"]
        );
    }

    #[test]
    fn test_chapters_sort_among_their_verses() {
        assert!(UnitId::chapter(1, 2) > UnitId::verse(1, 1, 1));
        assert!(UnitId::chapter(1, 1) < UnitId::verse(1, 1, 1));
        assert!(UnitId::chapter(1, 2) < UnitId::verse(1, 2, 1));
        assert!(UnitId::incipit(1) < UnitId::chapter(1, 1));
        assert!(UnitId::explicit(1) > UnitId::chapter(1, 50));
        assert!(UnitId::book(1) < UnitId::incipit(1));
        assert!(UnitId::explicit(1) < UnitId::book(2));

        let mut ids = vec![
            UnitId::chapter(1, 2),
            UnitId::verse(1, 1, 1),
            UnitId::verse(1, 2, 1),
            UnitId::chapter(1, 1),
        ];
        ids.sort();
        let labels: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(labels, ["B01K1", "B01K1V1", "B01K2", "B01K2V1"]);
    }

    #[test]
    fn test_parse_division_checks_level() {
        assert!(UnitId::parse_division("verse", "B01K1V1").is_ok());
        assert!(UnitId::parse_division("chapter", "B01K1V1").is_err());
        assert_eq!(
            UnitId::parse_division("incipit", "B01").unwrap(),
            UnitId::incipit(1)
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&UnitId::verse(2, 3, 4)).unwrap();
        assert_eq!(json, "\"B02K3V4\"");
        let back: UnitId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UnitId::verse(2, 3, 4));
    }
}
