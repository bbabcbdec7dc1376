use serde::{Deserialize, Serialize};

/// One scraped row as the page-data collaborator dumps it. Everything is optional:
/// the three sites expose different subsets and the scraper never guarantees a
/// field survived a layout change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPick {
    #[serde(default)]
    pub fixture: Option<String>,
    #[serde(default)]
    pub pick: Option<String>,
    /// Confidence as scraped, e.g. "72%" or "72". Parsed later.
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub odds: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub competition: Option<String>,
    #[serde(default)]
    pub kickoff: Option<String>,
    #[serde(default)]
    pub win_info: Option<String>,
    #[serde(default)]
    pub expected_goals: Option<f64>,
    #[serde(default)]
    pub goal_total: Option<u32>,
}

/// The common projection every source is mapped onto before matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPick {
    pub fixture: String,
    pub pick: String,
    /// `None` or a value in `[0, 100]`.
    pub confidence_percent: Option<f64>,
    pub odds: Option<String>,
    pub result: Option<String>,
    /// Audit-only extras carried through from the raw row.
    pub expected_goals: Option<f64>,
    pub goal_total: Option<u32>,
}

/// Coerce a scraped confidence string ("72%", " 65 ") to a percentage.
/// Malformed or out-of-range input is a missing value, never an error.
pub fn parse_confidence(text: &str) -> Option<f64> {
    let cleaned = text.trim().trim_end_matches('%').trim();
    let value = cleaned.parse::<f64>().ok()?;
    if (0.0..=100.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}

/// Goals line derived from an expected-goals figure: next whole goal plus a
/// half, so the line can never push.
pub fn goal_line(expected_goals: f64) -> f64 {
    expected_goals.ceil() + 0.5
}

/// Whether a finished match stayed under the derived line.
pub fn under_flag(line: f64, total_goals: u32) -> bool {
    line > f64::from(total_goals)
}

impl NormalizedPick {
    /// Goals line for this row, when the source carried an xG figure.
    pub fn goals_pick(&self) -> Option<f64> {
        self.expected_goals.map(goal_line)
    }

    /// Under/over outcome for this row, when both line and final total exist.
    pub fn under(&self) -> Option<bool> {
        match (self.goals_pick(), self.goal_total) {
            (Some(line), Some(total)) => Some(under_flag(line, total)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_and_bare_numbers() {
        assert_eq!(parse_confidence("72%"), Some(72.0));
        assert_eq!(parse_confidence(" 65 "), Some(65.0));
        assert_eq!(parse_confidence("58.5%"), Some(58.5));
        assert_eq!(parse_confidence("0"), Some(0.0));
        assert_eq!(parse_confidence("100%"), Some(100.0));
    }

    #[test]
    fn malformed_confidence_is_missing() {
        assert_eq!(parse_confidence(""), None);
        assert_eq!(parse_confidence("n/a"), None);
        assert_eq!(parse_confidence("%"), None);
    }

    #[test]
    fn out_of_range_confidence_is_missing() {
        assert_eq!(parse_confidence("120%"), None);
        assert_eq!(parse_confidence("-5"), None);
    }

    #[test]
    fn goal_line_rounds_up_and_adds_half() {
        assert_eq!(goal_line(2.3), 3.5);
        assert_eq!(goal_line(3.0), 3.5);
        assert_eq!(goal_line(0.1), 1.5);
    }

    #[test]
    fn under_flag_compares_line_to_total() {
        assert!(under_flag(3.5, 2));
        assert!(!under_flag(3.5, 4));
    }
}
