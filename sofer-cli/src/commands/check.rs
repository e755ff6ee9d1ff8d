//! Check command implementation

use super::load_witness;
use anyhow::{bail, Result};
use sofer_core::lint::inspect;
use sofer_core::SoferConfig;
use std::path::Path;

/// Report unit issues and lint findings for a witness
pub fn check(input: &str, strict: bool) -> Result<()> {
    let witness = load_witness(Path::new(input), &SoferConfig::default())?;
    let findings = inspect(&witness);

    for issue in &witness.issues {
        println!("issue: {}", issue);
    }
    for finding in &findings {
        println!("lint:  {}", finding);
    }

    println!(
        "{}: {} units, {} issues, {} findings",
        witness.siglum,
        witness.units.len(),
        witness.issues.len(),
        findings.len()
    );

    if !witness.issues.is_empty() {
        bail!("{} has {} unreadable units", input, witness.issues.len());
    }
    if strict && !findings.is_empty() {
        bail!("{} has {} lint findings", input, findings.len());
    }

    Ok(())
}
