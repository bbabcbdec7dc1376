use crate::matching::{self, MatchStrategy, SecondaryTable};
use crate::merge::{self, MergedRecord};
use crate::normalize::{self, NormalizeReport, SourceRules};
use crate::picks::{NormalizedPick, RawPick};

/// One source's raw batch together with its policy. The first
/// `SourceBatch` handed to [`run`] is the primary (left side of the join);
/// the rest are secondaries.
#[derive(Debug)]
pub struct SourceBatch {
    pub name: String,
    pub rows: Vec<RawPick>,
    pub rules: SourceRules,
}

impl SourceBatch {
    pub fn new(name: impl Into<String>, rows: Vec<RawPick>, rules: SourceRules) -> Self {
        Self {
            name: name.into(),
            rows,
            rules,
        }
    }
}

/// Per-source tallies for the run summary. Skips are counted, not raised.
#[derive(Debug, Default)]
pub struct SourceStats {
    pub name: String,
    pub scraped: usize,
    pub kept: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub sources: Vec<SourceStats>,
    pub primary_matched: usize,
    pub primary_unmatched: usize,
}

/// Everything one run produces. Buffers are owned by the output; nothing is
/// shared across invocations.
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<MergedRecord>,
    /// Unfiltered audit variant of the primary source.
    pub primary_full: Vec<NormalizedPick>,
    /// Filtered primary rows, in input order.
    pub primary_kept: Vec<NormalizedPick>,
    /// Audit variants per secondary source, in input order.
    pub secondary_full: Vec<(String, Vec<NormalizedPick>)>,
    pub report: PipelineReport,
}

/// Normalize every source, match each kept primary row against the
/// secondaries, and aggregate. Pure batch transform: runs to completion over
/// in-memory input, empty input yields empty (valid) output.
pub fn run(
    primary: SourceBatch,
    secondaries: Vec<SourceBatch>,
    strategy: &dyn MatchStrategy,
) -> PipelineOutput {
    let mut report = PipelineReport::default();

    let primary_report = normalize::normalize(&primary.rules, &primary.rows);
    report.sources.push(stats(&primary.name, primary.rows.len(), &primary_report));

    let mut secondary_full = Vec::with_capacity(secondaries.len());
    let mut tables = Vec::with_capacity(secondaries.len());
    for batch in secondaries {
        let normalized = normalize::normalize(&batch.rules, &batch.rows);
        report
            .sources
            .push(stats(&batch.name, batch.rows.len(), &normalized));
        secondary_full.push((batch.name.clone(), normalized.full));
        tables.push(SecondaryTable::new(batch.name, normalized.kept));
    }

    let mut records = Vec::new();
    for pick in &primary_report.kept {
        let outcome = matching::match_against(pick, &tables, strategy);
        match merge::aggregate(pick, &outcome, &tables) {
            Some(record) => {
                report.primary_matched += 1;
                records.push(record);
            }
            None => report.primary_unmatched += 1,
        }
    }

    PipelineOutput {
        records,
        primary_full: primary_report.full,
        primary_kept: primary_report.kept,
        secondary_full,
        report,
    }
}

fn stats(name: &str, scraped: usize, normalized: &NormalizeReport) -> SourceStats {
    SourceStats {
        name: name.to_string(),
        scraped,
        kept: normalized.kept.len(),
        skipped: normalized.skipped.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::TokenContainment;

    fn raw(fixture: &str, pick: &str, confidence: &str) -> RawPick {
        RawPick {
            fixture: Some(fixture.to_string()),
            pick: Some(pick.to_string()),
            confidence: Some(confidence.to_string()),
            ..RawPick::default()
        }
    }

    fn lax() -> SourceRules {
        SourceRules::default()
    }

    #[test]
    fn empty_inputs_produce_empty_valid_output() {
        let out = run(
            SourceBatch::new("ai", Vec::new(), lax()),
            vec![
                SourceBatch::new("OLBG", Vec::new(), lax()),
                SourceBatch::new("Oddspedia", Vec::new(), lax()),
            ],
            &TokenContainment,
        );
        assert!(out.records.is_empty());
        assert!(out.primary_full.is_empty());
        assert_eq!(out.report.primary_matched, 0);
    }

    #[test]
    fn merged_output_preserves_primary_order() {
        let primary = SourceBatch::new(
            "ai",
            vec![
                raw("Leeds vs Hull", "Leeds", "70"),
                raw("Derby vs Leeds", "Leeds away", "60"),
            ],
            lax(),
        );
        let secondary = SourceBatch::new(
            "OLBG",
            vec![raw("Leeds vs Hull", "Leeds to win", "64")],
            lax(),
        );

        let out = run(primary, vec![secondary], &TokenContainment);
        // Both primary rows share the token "leeds" and match the same
        // secondary row; output order must follow primary input order.
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].pick, "Leeds");
        assert_eq!(out.records[1].pick, "Leeds away");
    }

    #[test]
    fn unmatched_primary_rows_are_counted_not_errored() {
        let primary = SourceBatch::new(
            "ai",
            vec![raw("A vs B", "Alpha", "70"), raw("C vs D", "Charlie", "70")],
            lax(),
        );
        let secondary = SourceBatch::new("OLBG", vec![raw("A vs B", "Alpha win", "64")], lax());

        let out = run(primary, vec![secondary], &TokenContainment);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.report.primary_matched, 1);
        assert_eq!(out.report.primary_unmatched, 1);
    }

    #[test]
    fn fresh_buffers_per_run() {
        let make = || {
            run(
                SourceBatch::new("ai", vec![raw("A vs B", "Alpha", "70")], lax()),
                vec![SourceBatch::new(
                    "OLBG",
                    vec![raw("A vs B", "Alpha win", "64")],
                    lax(),
                )],
                &TokenContainment,
            )
        };
        let first = make();
        let second = make();
        assert_eq!(first.records.len(), second.records.len());
        assert_eq!(first.report.primary_matched, second.report.primary_matched);
    }
}
