//! Field sets for the edition's bibliography categories
//!
//! These tables only say which fields a citation of each category carries. Formatting is left
//! to the typesetting layer that consumes them.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Fields of one citation category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSet {
    /// Must be present in every entry
    pub required: Vec<String>,
    /// May be present
    pub optional: Vec<String>,
    /// Computed by the typesetting layer from other fields
    pub derived: Vec<String>,
}

impl FieldSet {
    pub fn new(required: &[&str], optional: &[&str], derived: &[&str]) -> Self {
        let owned = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect();
        Self {
            required: owned(required),
            optional: owned(optional),
            derived: owned(derived),
        }
    }

    /// Whether an entry may carry this field
    pub fn knows(&self, field: &str) -> bool {
        [&self.required, &self.optional, &self.derived]
            .into_iter()
            .any(|fields| fields.iter().any(|f| f == field))
    }
}

/// A problem found in a bibliography entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "problem", content = "name", rename_all = "snake_case")]
pub enum FieldProblem {
    UnknownCategory(String),
    MissingRequired(String),
    UnknownField(String),
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::UnknownCategory(name) => write!(f, "unknown category '{}'", name),
            FieldProblem::MissingRequired(name) => write!(f, "missing required field '{}'", name),
            FieldProblem::UnknownField(name) => write!(f, "unknown field '{}'", name),
        }
    }
}

/// Category name to field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibliographySpec {
    pub categories: BTreeMap<String, FieldSet>,
}

impl Default for BibliographySpec {
    fn default() -> Self {
        let categories = [
            (
                "book",
                FieldSet::new(
                    &["author", "title", "year"],
                    &["editor", "edition", "volume", "series", "publisher", "location", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
            (
                "article",
                FieldSet::new(
                    &["author", "title", "journal", "year"],
                    &["volume", "number", "pages", "doi", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
            (
                "incollection",
                FieldSet::new(
                    &["author", "title", "booktitle", "year"],
                    &["editor", "pages", "publisher", "location", "series", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
            (
                "edition",
                FieldSet::new(
                    &["title", "editor", "year"],
                    &["siglum", "volume", "publisher", "location", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
            (
                "manuscript",
                FieldSet::new(
                    &["siglum", "shelfmark", "repository"],
                    &["date", "origin", "facsimile", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
            (
                "online",
                FieldSet::new(
                    &["title", "url"],
                    &["author", "urldate", "note"],
                    &["sortname"],
                ),
            ),
            (
                "thesis",
                FieldSet::new(
                    &["author", "title", "institution", "year"],
                    &["type", "location", "note"],
                    &["shorttitle", "sortname"],
                ),
            ),
        ];

        Self {
            categories: categories
                .into_iter()
                .map(|(name, fields)| (name.to_string(), fields))
                .collect(),
        }
    }
}

impl BibliographySpec {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let spec: Self = serde_json::from_str(json)?;
        for (name, fields) in &spec.categories {
            if fields.required.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "category '{}' has no required fields",
                    name
                )));
            }
        }
        Ok(spec)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn category(&self, name: &str) -> Option<&FieldSet> {
        self.categories.get(name)
    }

    /// Check the field names of one entry against its category
    pub fn check<'a, I>(&self, category: &str, fields: I) -> Vec<FieldProblem>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(set) = self.category(category) else {
            return vec![FieldProblem::UnknownCategory(category.to_string())];
        };
        let fields: Vec<&str> = fields.into_iter().collect();

        let missing = set
            .required
            .iter()
            .filter(|required| !fields.contains(&required.as_str()))
            .map(|f| FieldProblem::MissingRequired(f.clone()));
        let unknown = fields
            .iter()
            .filter(|f| !set.knows(f))
            .map(|f| FieldProblem::UnknownField(f.to_string()));
        missing.chain(unknown).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let spec = BibliographySpec::default();
        assert!(spec.category("book").is_some());
        assert!(spec.category("manuscript").unwrap().knows("shelfmark"));
        assert!(spec.categories.values().all(|f| !f.required.is_empty()));
    }

    #[test]
    fn test_check_reports_missing_and_unknown() {
        let spec = BibliographySpec::default();
        let problems = spec.check("book", ["author", "title", "isbn"]);
        assert_eq!(
            problems,
            vec![
                FieldProblem::MissingRequired("year".to_string()),
                FieldProblem::UnknownField("isbn".to_string()),
            ]
        );
        assert!(spec
            .check("book", ["author", "title", "year", "sortname"])
            .is_empty());
    }

    #[test]
    fn test_unknown_category() {
        let problems = BibliographySpec::default().check("poster", ["title"]);
        assert_eq!(
            problems,
            vec![FieldProblem::UnknownCategory("poster".to_string())]
        );
    }

    #[test]
    fn test_from_json() {
        let spec = BibliographySpec::from_json(
            r#"{"tract": {"required": ["title"], "optional": ["author"]}}"#,
        )
        .unwrap();
        assert_eq!(spec.category("tract").unwrap().derived.len(), 0);
        assert!(spec.check("tract", ["title", "author"]).is_empty());

        let err = BibliographySpec::from_json(r#"{"tract": {"optional": ["author"]}}"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }
}
