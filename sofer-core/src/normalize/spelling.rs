//! Spelling tables that map a consonantal skeleton to the edition's canonical form

use super::marks::{is_letter, DAGESH};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

const SRO: &[(&str, &str)] = &[
    ("יהוה", "יַהְוֶה"),
    ("ויהוה", "וְיַהְוֶה"),
    ("ביהוה", "בְיַהְוֶה"),
    ("וּביהוה", "וּבְיַהְוֶה"),
    ("בּיהוה", "בְּיַהְוֶה"),
    ("ליהוה", "לְיַהְוֶה"),
    ("וליהוה", "וּלְיַהְוֶה"),
    ("מיהוה", "מִיַּהְוֶה"),
    ("וּמיהוה", "וּמִיַּהְוֶה"),
    ("שיהוה", "שִׁיַּהְוֶה"),
    ("ירוּשלם", "יְרוּשָׁלֵם"),
    ("וירוּשלם", "וִיְרוּשָׁלֵם"),
    ("בירוּשלם", "בִירוּשָׁלֵם"),
    ("וּבירוּשלם", "וּבִירוּשָׁלֵם"),
    ("בּירוּשלם", "בִּירוּשָׁלֵם"),
    ("לירוּשלם", "לִירוּשָׁלֵם"),
    ("ולירוּשלם", "וְלִירוּשָׁלֵם"),
    ("מירוּשלם", "מִירוּשָׁלֵם"),
    ("וּמירוּשלם", "וּמִירוּשָׁלֵם"),
];

const SRO_CHRONICLES: &[(&str, &str)] = &[
    ("יהוה", "יְהֹוַה"),
    ("ויהוה", "וַיהֹוַה"),
    ("ביהוה", "בַיהֹוַה"),
    ("בּיהוה", "בַּיהֹוַה"),
    ("ליהוה", "לַיהֹוַה"),
    ("מיהוה", "מֵיְהֹוַה"),
    ("ירוּשלם", "יְרוּשָׁלֵם"),
    ("וירוּשלם", "וִיְרוּשָׁלֵם"),
    ("בירוּשלם", "בִירוּשָׁלֵם"),
    ("וּבירוּשלם", "וּבִירוּשָׁלֵם"),
    ("בּירוּשלם", "בִּירוּשָׁלֵם"),
    ("לירוּשלם", "לִירוּשָׁלֵם"),
    ("ולירוּשלם", "וְלִירוּשָׁלֵם"),
    ("מירוּשלם", "מִירוּשָׁלֵם"),
    ("וּמירוּשלם", "וּמִירוּשָׁלֵם"),
];

/// Consonants and dagesh only, in canonical order
pub fn skeleton(word: &str) -> String {
    word.nfd().filter(|&c| is_letter(c) || c == DAGESH).collect()
}

/// Canonical spellings keyed by consonantal skeleton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellingTable {
    entries: BTreeMap<String, String>,
}

impl SpellingTable {
    /// Build a table from `(spelling, canonical)` pairs
    ///
    /// Keys are reduced to their skeleton, so any pointed spelling of the word may be given.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (skeleton(k.as_ref()), v.as_ref().nfd().collect()))
            .collect();
        Self { entries }
    }

    /// The general SRO conventions
    pub fn sro() -> Self {
        Self::from_pairs(SRO.iter().copied())
    }

    /// The SRO conventions for 1 and 2 Chronicles
    pub fn sro_chronicles() -> Self {
        Self::from_pairs(SRO_CHRONICLES.iter().copied())
    }

    /// Canonical spelling for a word, in NFD
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(&skeleton(word)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Named spelling conventions selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpellingScheme {
    #[default]
    None,
    Sro,
    SroChronicles,
}

impl SpellingScheme {
    pub fn table(&self) -> Option<SpellingTable> {
        match self {
            SpellingScheme::None => None,
            SpellingScheme::Sro => Some(SpellingTable::sro()),
            SpellingScheme::SroChronicles => Some(SpellingTable::sro_chronicles()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpellingScheme::None => "none",
            SpellingScheme::Sro => "sro",
            SpellingScheme::SroChronicles => "sro-chronicles",
        }
    }
}

impl fmt::Display for SpellingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpellingScheme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SpellingScheme::None),
            "sro" => Ok(SpellingScheme::Sro),
            "sro-chronicles" | "chronicles" | "chron" => Ok(SpellingScheme::SroChronicles),
            _ => Err(ParseError::MalformedContent(format!(
                "unknown spelling scheme '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_vowels_and_accents() {
        let table = SpellingTable::sro();
        // Tetragrammaton pointed with sheva and qamats, plus an accent
        let pointed = "\u{05D9}\u{05B0}\u{05D4}\u{05B8}\u{0591}\u{05D5}\u{05B8}\u{05D4}";
        let expected: String = "יַהְוֶה".nfd().collect();
        assert_eq!(table.lookup(pointed), Some(expected.as_str()));
    }

    #[test]
    fn test_dagesh_is_part_of_the_key() {
        let table = SpellingTable::sro();
        let with_dagesh = table.lookup("בּיהוה").map(str::to_string);
        let without = table.lookup("ביהוה").map(str::to_string);
        assert!(with_dagesh.is_some());
        assert!(without.is_some());
        assert_ne!(with_dagesh, without);
    }

    #[test]
    fn test_chronicles_differs() {
        assert_ne!(
            SpellingTable::sro().lookup("יהוה"),
            SpellingTable::sro_chronicles().lookup("יהוה")
        );
        assert_eq!(SpellingTable::sro_chronicles().lookup("שיהוה"), None);
    }

    #[test]
    fn test_canonical_forms_are_fixed_points() {
        for table in [SpellingTable::sro(), SpellingTable::sro_chronicles()] {
            for (_, canonical) in table.iter() {
                if let Some(again) = table.lookup(canonical) {
                    assert_eq!(again, canonical);
                }
            }
        }
    }

    #[test]
    fn test_parse_scheme() {
        assert_eq!(
            "sro-chronicles".parse::<SpellingScheme>().unwrap(),
            SpellingScheme::SroChronicles
        );
        assert_eq!("none".parse::<SpellingScheme>().unwrap(), SpellingScheme::None);
        assert!("masoretic".parse::<SpellingScheme>().is_err());
        assert!(SpellingScheme::None.table().is_none());
    }
}
