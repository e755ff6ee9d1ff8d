//! Plene (male) to defective spelling

use super::marks::{MarkClass, ALEF, HIRIQ, HOLAM, QUBUTS, SEGOL, SHEVA, TSERE, VAV, YOD};
use unicode_normalization::UnicodeNormalization;

/// Replace vowel letters with the vowel points they stand for
///
/// Expects pointed text. Cantillation and puncta are dropped, other characters are kept as
/// they are. The first and last letter of every word are never touched.
pub fn strip_plene(s: &str) -> String {
    let mut clusters: Vec<String> = Vec::new();
    for c in s.nfkd() {
        if MarkClass::Pointing.contains(c) {
            // Points before the first letter have nothing to attach to
            if let Some(last) = clusters.last_mut() {
                last.push(c);
            }
        } else if !MarkClass::Cantillation.contains(c) && !MarkClass::Extraordinaire.contains(c) {
            clusters.push(c.to_string());
        }
    }

    let n = clusters.len();
    let mut prev = String::new();
    for i in 0..n {
        let current = clusters[i].clone();
        let first_in_word = i == 0 || prev == " ";
        let last_in_word = i + 1 == n || clusters[i + 1] == " ";

        if current == " " || first_in_word || last_in_word {
            // unchanged
        } else if is_bare(&current, ALEF) {
            clusters[i].clear();
        } else if is_bare(&current, VAV) && is_bare(&prev, ALEF) && i > 1 && clusters[i - 2] != " "
        {
            // Alef-vav digraph: holam on the letter before it
            clusters[i].clear();
            clusters[i - 1].clear();
            if !clusters[i - 2].contains(HOLAM) {
                clusters[i - 2].push(HOLAM);
            }
        } else if current == format!("{VAV}{HOLAM}") {
            clusters[i].clear();
            clusters[i - 1].push(HOLAM);
        } else if current == format!("{VAV}\u{05BC}") {
            // Shuruq becomes qubuts
            clusters[i].clear();
            clusters[i - 1].push(QUBUTS);
        } else if (is_bare(&current, YOD) || current == format!("{YOD}{SHEVA}"))
            && [HIRIQ, TSERE, SEGOL].iter().any(|p| prev.contains(*p))
        {
            clusters[i].clear();
        }
        prev = current;
    }

    clusters.concat().nfc().collect()
}

fn is_bare(cluster: &str, letter: char) -> bool {
    let mut chars = cluster.chars();
    chars.next() == Some(letter) && chars.next().is_none()
}
