use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::merge::MergedRecord;

/// Render the dashboard page for one day's merged records. Missing
/// confidence renders as N/A rather than an empty cell so the table stays
/// readable; an empty batch renders a single empty-state row.
pub fn render_day_page(records: &[MergedRecord], date: NaiveDate, secondary_names: &[String]) -> String {
    let mut head_cells = String::new();
    head_cells.push_str("<th>Fixture</th><th>Pick</th><th>AI Confidence</th>");
    for name in secondary_names {
        head_cells.push_str(&format!("<th>{} Confidence</th>", escape(name)));
    }
    head_cells.push_str("<th>Odds</th>");

    let columns = 4 + secondary_names.len();
    let body = if records.is_empty() {
        format!("<tr><td colspan=\"{columns}\" class=\"empty\">No common picks found for this day.</td></tr>\n")
    } else {
        records.iter().map(table_row).collect::<String>()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Football Predictions — {date}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; color: #222; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 0.5rem 0.75rem; text-align: left; }}
th {{ background: #eef; }}
td.conf {{ text-align: center; }}
td.na, td.empty {{ color: #999; text-align: center; }}
</style>
</head>
<body>
<h1>Football Predictions — {date}</h1>
<p>Confidence levels from each source for picks at least two sources agree on.</p>
<table>
<thead><tr>{head_cells}</tr></thead>
<tbody>
{body}</tbody>
</table>
</body>
</html>
"#
    )
}

fn table_row(record: &MergedRecord) -> String {
    let mut cells = format!(
        "<td>{}</td><td>{}</td>{}",
        escape(&record.fixture),
        escape(&record.pick),
        confidence_cell(record.primary_confidence),
    );
    for (_, confidence) in &record.secondary_confidence {
        cells.push_str(&confidence_cell(*confidence));
    }
    match record.odds.as_deref() {
        Some(odds) => cells.push_str(&format!("<td class=\"conf\">{}</td>", escape(odds))),
        None => cells.push_str("<td class=\"na\">N/A</td>"),
    }
    format!("<tr>{cells}</tr>\n")
}

fn confidence_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("<td class=\"conf\">{v:.0}%</td>"),
        Some(v) => format!("<td class=\"conf\">{v}%</td>"),
        None => "<td class=\"na\">N/A</td>".to_string(),
    }
}

/// Render the site index: one link per generated day page, newest first.
pub fn render_index(days: &[NaiveDate]) -> String {
    let mut items = String::new();
    let mut sorted: Vec<NaiveDate> = days.to_vec();
    sorted.sort();
    for date in sorted.iter().rev() {
        let href = day_page_href(*date);
        items.push_str(&format!("<li><a href=\"{href}\">{date}</a></li>\n"));
    }
    if items.is_empty() {
        items.push_str("<li class=\"empty\">No prediction pages generated yet.</li>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Football Predictions</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; color: #222; }}
li.empty {{ color: #999; list-style: none; }}
</style>
</head>
<body>
<h1>Football Predictions</h1>
<ul>
{items}</ul>
</body>
</html>
"#
    )
}

pub fn day_page_href(date: NaiveDate) -> String {
    format!("{}/{}_predictions.html", date.format("%Y-%m-%d"), date.format("%d"))
}

/// Write the day page into its dated subdirectory and refresh the index at
/// the site root. Pages are written to a temp name and renamed into place so
/// a crash never leaves a half-written page being served.
pub fn write_site(
    out_dir: &Path,
    date: NaiveDate,
    records: &[MergedRecord],
    secondary_names: &[String],
) -> Result<()> {
    let day_dir = out_dir.join(date.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&day_dir)
        .with_context(|| format!("creating {}", day_dir.display()))?;

    let day_path = day_dir.join(format!("{}_predictions.html", date.format("%d")));
    write_atomic(&day_path, &render_day_page(records, date, secondary_names))?;

    let days = existing_day_pages(out_dir)?;
    write_atomic(&out_dir.join("index.html"), &render_index(&days))?;
    Ok(())
}

fn existing_day_pages(out_dir: &Path) -> Result<Vec<NaiveDate>> {
    let mut days = Vec::new();
    let entries = fs::read_dir(out_dir).with_context(|| format!("listing {}", out_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(name, "%Y-%m-%d") {
            days.push(date);
        }
    }
    Ok(days)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swapping {}", path.display()))?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
