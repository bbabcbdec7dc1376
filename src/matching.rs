use std::collections::BTreeSet;

use crate::picks::NormalizedPick;
use crate::tokens::tokenize;

/// How a primary pick is compared against one secondary row. The pipeline
/// shape never changes when the policy does, so stricter strategies can be
/// swapped in without touching the matcher.
pub trait MatchStrategy {
    fn is_candidate(&self, primary_tokens: &BTreeSet<String>, secondary_pick_lower: &str) -> bool;
}

/// The behavior-compatible default: a secondary row is a candidate when any
/// primary token appears anywhere inside its lowercased pick text. Loose and
/// asymmetric on purpose — recall over precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenContainment;

impl MatchStrategy for TokenContainment {
    fn is_candidate(&self, primary_tokens: &BTreeSet<String>, secondary_pick_lower: &str) -> bool {
        primary_tokens
            .iter()
            .any(|token| secondary_pick_lower.contains(token.as_str()))
    }
}

/// Stricter alternative: both sides are tokenized and must share a whole
/// word. Not the default; exists to prove the policy seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl MatchStrategy for TokenOverlap {
    fn is_candidate(&self, primary_tokens: &BTreeSet<String>, secondary_pick_lower: &str) -> bool {
        let secondary_tokens = tokenize(secondary_pick_lower);
        primary_tokens.intersection(&secondary_tokens).next().is_some()
    }
}

/// One secondary source's filtered batch, with pick texts lowercased once up
/// front so the per-primary scan stays cheap.
#[derive(Debug)]
pub struct SecondaryTable {
    pub name: String,
    pub rows: Vec<NormalizedPick>,
    pick_lower: Vec<String>,
}

impl SecondaryTable {
    pub fn new(name: impl Into<String>, rows: Vec<NormalizedPick>) -> Self {
        let pick_lower = rows.iter().map(|r| r.pick.to_lowercase()).collect();
        Self {
            name: name.into(),
            rows,
            pick_lower,
        }
    }
}

/// Per-secondary-source result for one primary row: the index of the matched
/// row, or `None`. `None` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub per_source: Vec<Option<usize>>,
}

impl MatchOutcome {
    pub fn any_matched(&self) -> bool {
        self.per_source.iter().any(|m| m.is_some())
    }
}

/// Find, for each secondary table, the first candidate row in original row
/// order. First-match tie-breaking is deliberate: it keeps output stable and
/// mirrors how the comparison has always behaved.
pub fn match_against(
    primary: &NormalizedPick,
    tables: &[SecondaryTable],
    strategy: &dyn MatchStrategy,
) -> MatchOutcome {
    let primary_tokens = tokenize(&primary.pick);

    let per_source = tables
        .iter()
        .map(|table| {
            if primary_tokens.is_empty() {
                return None;
            }
            table
                .pick_lower
                .iter()
                .position(|pick| strategy.is_candidate(&primary_tokens, pick))
        })
        .collect();

    MatchOutcome { per_source }
}
