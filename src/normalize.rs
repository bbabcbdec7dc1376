use std::env;

use crate::picks::{NormalizedPick, RawPick, parse_confidence};

/// Per-source normalization policy. Thresholds and exclusion keywords are
/// policy knobs, not mechanism: each site gets its own instance.
#[derive(Debug, Clone, Default)]
pub struct SourceRules {
    /// Rows with confidence below this (or with no parseable confidence at
    /// all) are dropped before matching. `None` disables the filter.
    pub min_confidence: Option<f64>,
    /// Rows whose pick text contains any of these substrings are dropped
    /// entirely. Used on the primary source to discard non-bettable pick
    /// types (over/under lines, handicaps, draw calls).
    pub exclude_keywords: Vec<String>,
}

impl SourceRules {
    pub fn primary() -> Self {
        let rules = Self {
            min_confidence: Some(55.0),
            exclude_keywords: ["Yes", "Over", "Under", "-", "+", "Draw"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        rules.with_env_threshold("PRIMARY_MIN_CONFIDENCE")
    }

    pub fn secondary() -> Self {
        let rules = Self {
            min_confidence: Some(60.0),
            exclude_keywords: Vec::new(),
        };
        rules.with_env_threshold("SECONDARY_MIN_CONFIDENCE")
    }

    fn with_env_threshold(mut self, var: &str) -> Self {
        if let Some(value) = env::var(var)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
        {
            self.min_confidence = Some(value.clamp(0.0, 100.0));
        }
        self
    }
}

/// Why a raw row did not make it into the filtered batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The row lacks the field named here; it is unusable even for audit.
    MissingField(&'static str),
    /// Confidence missing or under the source threshold.
    BelowThreshold,
    /// Pick text contains an excluded keyword.
    ExcludedKeyword(String),
}

#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: SkipReason,
}

/// Output of normalizing one source's batch. `full` is the unfiltered audit
/// variant; `kept` is what the matcher sees. Skips are recorded, never raised.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub full: Vec<NormalizedPick>,
    pub kept: Vec<NormalizedPick>,
    pub skipped: Vec<SkippedRow>,
}

impl NormalizeReport {
    pub fn skipped_for(&self, reason_is: impl Fn(&SkipReason) -> bool) -> usize {
        self.skipped.iter().filter(|s| reason_is(&s.reason)).count()
    }
}

/// Map one source's raw rows onto the common schema and apply its policy.
///
/// Per-row failures never abort the batch: a malformed row is recorded as a
/// skip and processing continues. Rows that survive projection but fail the
/// policy filters still appear in the `full` audit variant.
pub fn normalize(rules: &SourceRules, raw_rows: &[RawPick]) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for (index, raw) in raw_rows.iter().enumerate() {
        let Some(pick) = projected(raw) else {
            report.skipped.push(SkippedRow {
                index,
                reason: SkipReason::MissingField(missing_field(raw)),
            });
            continue;
        };

        report.full.push(pick.clone());

        if let Some(keyword) = excluded_keyword(rules, &pick.pick) {
            report.skipped.push(SkippedRow {
                index,
                reason: SkipReason::ExcludedKeyword(keyword),
            });
            continue;
        }

        if let Some(min) = rules.min_confidence {
            let passes = pick.confidence_percent.is_some_and(|c| c >= min);
            if !passes {
                report.skipped.push(SkippedRow {
                    index,
                    reason: SkipReason::BelowThreshold,
                });
                continue;
            }
        }

        report.kept.push(pick);
    }

    report
}

fn projected(raw: &RawPick) -> Option<NormalizedPick> {
    let fixture = raw.fixture.as_deref()?.trim().to_string();
    let pick = raw.pick.as_deref()?.trim().to_string();
    if fixture.is_empty() {
        return None;
    }

    Some(NormalizedPick {
        fixture,
        pick,
        confidence_percent: raw.confidence.as_deref().and_then(parse_confidence),
        odds: raw.odds.clone().filter(|s| !s.trim().is_empty()),
        result: raw.result.clone().filter(|s| !s.trim().is_empty()),
        expected_goals: raw.expected_goals,
        goal_total: raw.goal_total,
    })
}

fn missing_field(raw: &RawPick) -> &'static str {
    if raw.fixture.as_deref().is_none_or(|f| f.trim().is_empty()) {
        "fixture"
    } else {
        "pick"
    }
}

fn excluded_keyword(rules: &SourceRules, pick: &str) -> Option<String> {
    rules
        .exclude_keywords
        .iter()
        .find(|kw| pick.contains(kw.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fixture: &str, pick: &str, confidence: &str) -> RawPick {
        RawPick {
            fixture: Some(fixture.to_string()),
            pick: Some(pick.to_string()),
            confidence: Some(confidence.to_string()),
            ..RawPick::default()
        }
    }

    #[test]
    fn threshold_drops_low_confidence_but_keeps_audit_row() {
        let rules = SourceRules {
            min_confidence: Some(60.0),
            exclude_keywords: Vec::new(),
        };
        let rows = vec![raw("A vs B", "A", "72%"), raw("C vs D", "C", "51%")];
        let report = normalize(&rules, &rows);

        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].pick, "A");
        assert_eq!(report.full.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::BelowThreshold);
    }

    #[test]
    fn unparseable_confidence_fails_threshold_but_survives_without_one() {
        let strict = SourceRules {
            min_confidence: Some(55.0),
            exclude_keywords: Vec::new(),
        };
        let lax = SourceRules::default();
        let rows = vec![raw("A vs B", "A", "n/a")];

        assert!(normalize(&strict, &rows).kept.is_empty());
        let kept = normalize(&lax, &rows).kept;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence_percent, None);
    }

    #[test]
    fn exclusion_keywords_drop_non_bettable_picks() {
        let rules = SourceRules {
            min_confidence: None,
            exclude_keywords: vec!["Over".to_string(), "Draw".to_string()],
        };
        let rows = vec![
            raw("A vs B", "Over 2.5 goals", "80%"),
            raw("C vs D", "Draw", "70%"),
            raw("E vs F", "E to win", "70%"),
        ];
        let report = normalize(&rules, &rows);

        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].pick, "E to win");
        assert_eq!(
            report.skipped_for(|r| matches!(r, SkipReason::ExcludedKeyword(_))),
            2
        );
    }

    #[test]
    fn rows_missing_fixture_or_pick_are_skipped_with_reason() {
        let rows = vec![
            RawPick {
                pick: Some("A to win".to_string()),
                ..RawPick::default()
            },
            RawPick {
                fixture: Some("A vs B".to_string()),
                ..RawPick::default()
            },
        ];
        let report = normalize(&SourceRules::default(), &rows);

        assert!(report.kept.is_empty());
        assert!(report.full.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::MissingField("fixture"));
        assert_eq!(report.skipped[1].reason, SkipReason::MissingField("pick"));
    }

    #[test]
    fn empty_batch_yields_empty_report() {
        let report = normalize(&SourceRules::primary(), &[]);
        assert!(report.full.is_empty());
        assert!(report.kept.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn order_of_kept_rows_is_input_order() {
        let rules = SourceRules::default();
        let rows = vec![
            raw("A vs B", "first", "10"),
            raw("C vs D", "second", "20"),
            raw("E vs F", "third", "30"),
        ];
        let kept = normalize(&rules, &rows).kept;
        let picks: Vec<&str> = kept.iter().map(|p| p.pick.as_str()).collect();
        assert_eq!(picks, vec!["first", "second", "third"]);
    }
}
