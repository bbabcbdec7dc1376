use serde::Serialize;

use crate::matching::{MatchOutcome, SecondaryTable};
use crate::picks::NormalizedPick;

/// One merged comparison row: a primary pick plus the confidence each
/// secondary source assigned to the same real-world match. Only produced when
/// at least one secondary source agreed the match exists.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRecord {
    pub fixture: String,
    pub pick: String,
    pub primary_confidence: Option<f64>,
    /// (source name, confidence) in secondary-table order. A `None`
    /// confidence means the source had no matching row, or its confidence
    /// would not coerce to a number.
    pub secondary_confidence: Vec<(String, Option<f64>)>,
    /// Odds from the first matched secondary row that carries any.
    pub odds: Option<String>,
    /// Result marker from the primary row, when settled.
    pub result: Option<String>,
}

impl MergedRecord {
    pub fn confidence_for(&self, source: &str) -> Option<f64> {
        self.secondary_confidence
            .iter()
            .find(|(name, _)| name == source)
            .and_then(|(_, conf)| *conf)
    }
}

/// Combine one primary row with its match outcome. Returns `None` when no
/// secondary source matched — the row simply drops out of the merged output
/// (the unfiltered audit table upstream still has it).
pub fn aggregate(
    primary: &NormalizedPick,
    outcome: &MatchOutcome,
    tables: &[SecondaryTable],
) -> Option<MergedRecord> {
    if !outcome.any_matched() {
        return None;
    }

    let mut secondary_confidence = Vec::with_capacity(tables.len());
    let mut odds = None;

    for (table, matched) in tables.iter().zip(&outcome.per_source) {
        let row = matched.and_then(|idx| table.rows.get(idx));
        secondary_confidence.push((table.name.clone(), row.and_then(|r| r.confidence_percent)));
        if odds.is_none() {
            odds = row.and_then(|r| r.odds.clone());
        }
    }

    Some(MergedRecord {
        fixture: primary.fixture.clone(),
        pick: primary.pick.clone(),
        primary_confidence: primary.confidence_percent,
        secondary_confidence,
        odds,
        result: primary.result.clone(),
    })
}
