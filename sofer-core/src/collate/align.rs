//! Token alignment
//!
//! The two key sequences are aligned by longest common subsequence. When both ways of
//! skipping a token keep the subsequence optimal, the reference token is skipped first.
//! Unmatched runs become variation sites, and the smallest run of consecutive sites whose
//! spans hold the same multiset of keys is merged into a transposed region. The region is
//! then cut wherever both prefixes hold the same keys, so each minimal reordered block is
//! its own transposition.

use std::collections::BTreeMap;
use std::ops::Range;

/// A maximal run of unmatched tokens on either side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub reference: Range<usize>,
    pub transcription: Range<usize>,
    /// The spans hold the same keys in a different order
    pub transposed: bool,
}

/// Find the variation sites between two key sequences
pub fn align<T: Ord>(reference: &[T], transcription: &[T]) -> Vec<Site> {
    let sites = variation_sites(reference, transcription);
    merge_transpositions(sites, reference, transcription)
}

/// Suffix LCS lengths: `table[i][j]` is the LCS of `a[i..]` and `b[j..]`
fn lcs_table<T: Eq>(a: &[T], b: &[T]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}

fn variation_sites<T: Eq>(a: &[T], b: &[T]) -> Vec<Site> {
    let table = lcs_table(a, b);
    let mut sites = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let (mut i, mut j) = (0, 0);

    let close = |open: &mut Option<(usize, usize)>, i: usize, j: usize, sites: &mut Vec<Site>| {
        if let Some((si, sj)) = open.take() {
            sites.push(Site {
                reference: si..i,
                transcription: sj..j,
                transposed: false,
            });
        }
    };

    while i < a.len() || j < b.len() {
        if i < a.len() && j < b.len() && a[i] == b[j] {
            close(&mut open, i, j, &mut sites);
            i += 1;
            j += 1;
            continue;
        }
        open.get_or_insert((i, j));
        if j == b.len() || (i < a.len() && table[i + 1][j] >= table[i][j + 1]) {
            i += 1;
        } else {
            j += 1;
        }
    }
    close(&mut open, i, j, &mut sites);
    sites
}

fn merge_transpositions<T: Ord>(sites: Vec<Site>, a: &[T], b: &[T]) -> Vec<Site> {
    let mut merged = Vec::with_capacity(sites.len());
    let mut i = 0;
    while i < sites.len() {
        let start = &sites[i];
        let found = (i..sites.len()).find(|&j| {
            let reference = start.reference.start..sites[j].reference.end;
            let transcription = start.transcription.start..sites[j].transcription.end;
            is_reordering(&a[reference], &b[transcription])
        });
        match found {
            Some(j) => {
                merged.extend(split_blocks(
                    start.reference.start..sites[j].reference.end,
                    start.transcription.start..sites[j].transcription.end,
                    a,
                    b,
                ));
                i = j + 1;
            }
            None => {
                merged.push(start.clone());
                i += 1;
            }
        }
    }
    merged
}

/// Cut a reordered region of equal-length spans into minimal blocks
///
/// A block ends wherever the keys consumed so far on both sides balance. Blocks whose
/// keys already line up are matches, not transpositions, and are dropped.
fn split_blocks<T: Ord>(
    reference: Range<usize>,
    transcription: Range<usize>,
    a: &[T],
    b: &[T],
) -> Vec<Site> {
    let left = &a[reference.clone()];
    let right = &b[transcription.clone()];
    let mut balance: BTreeMap<&T, i64> = BTreeMap::new();
    let mut unbalanced = 0usize;
    let mut blocks = Vec::new();
    let mut from = 0;

    for k in 0..left.len() {
        for (key, step) in [(&left[k], 1), (&right[k], -1)] {
            let count = balance.entry(key).or_insert(0);
            let before = *count;
            *count += step;
            match (before == 0, *count == 0) {
                (true, false) => unbalanced += 1,
                (false, true) => unbalanced -= 1,
                _ => {}
            }
        }
        if unbalanced == 0 {
            if left[from..=k] != right[from..=k] {
                blocks.push(Site {
                    reference: reference.start + from..reference.start + k + 1,
                    transcription: transcription.start + from..transcription.start + k + 1,
                    transposed: true,
                });
            }
            from = k + 1;
        }
    }
    blocks
}

/// Same multiset of keys, different order
fn is_reordering<T: Ord>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() || a.is_empty() || a == b {
        return false;
    }
    let mut left: Vec<&T> = a.iter().collect();
    let mut right: Vec<&T> = b.iter().collect();
    left.sort();
    right.sort();
    left == right
}
