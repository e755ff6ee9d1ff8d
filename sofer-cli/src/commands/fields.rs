//! Fields command implementation

use anyhow::{Context, Result};
use sofer_core::bibliography::{BibliographySpec, FieldSet};

/// Print the bibliography field sets
pub fn fields(category: Option<&str>, spec: Option<&str>, json: bool) -> Result<()> {
    let spec = match spec {
        Some(path) => BibliographySpec::from_path(path)
            .with_context(|| format!("Failed to load field sets from {}", path))?,
        None => BibliographySpec::default(),
    };

    let selected: Vec<(&String, &FieldSet)> = match category {
        Some(name) => {
            let (key, set) = spec
                .categories
                .get_key_value(name)
                .with_context(|| format!("Unknown category: {}", name))?;
            vec![(key, set)]
        }
        None => spec.categories.iter().collect(),
    };

    if json {
        let map: std::collections::BTreeMap<_, _> = selected.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    for (name, set) in selected {
        println!("{}", name);
        println!("  required: {}", set.required.join(", "));
        if !set.optional.is_empty() {
            println!("  optional: {}", set.optional.join(", "));
        }
        if !set.derived.is_empty() {
            println!("  derived:  {}", set.derived.join(", "));
        }
    }

    Ok(())
}
