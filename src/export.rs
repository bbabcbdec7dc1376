use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Formula, Workbook, Worksheet};

use crate::merge::MergedRecord;
use crate::picks::NormalizedPick;

/// Write the merged comparison workbook: one sheet, the agreed column layout,
/// and an average-confidence formula row below the data so the sheet stays
/// self-updating when edited by hand.
pub fn write_combined_workbook(
    path: &Path,
    records: &[MergedRecord],
    secondary_names: &[String],
) -> Result<()> {
    let mut rows = vec![combined_header(secondary_names)];
    rows.extend(records.iter().map(combined_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Combined")?;
        write_rows(sheet, &rows)?;

        // Confidence columns start at C; one AVERAGE per confidence column.
        if !records.is_empty() {
            let last_data_row = rows.len() as u32; // 1-based, header on row 1
            for offset in 0..=secondary_names.len() {
                let col = 2 + offset as u16;
                let formula = average_formula(col, last_data_row);
                sheet.write_formula(last_data_row, col, Formula::new(&formula))?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

/// Write the unfiltered audit workbook: one sheet per source, every projected
/// row regardless of thresholds, plus the hit-rate formula block under the
/// primary sheet's Under column.
pub fn write_audit_workbook(
    path: &Path,
    primary_name: &str,
    primary_full: &[NormalizedPick],
    secondaries: &[(String, Vec<NormalizedPick>)],
) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(primary_name)?;
        let mut rows = vec![primary_audit_header()];
        rows.extend(primary_full.iter().map(primary_audit_row));
        write_rows(sheet, &rows)?;
        write_hit_rate_block(sheet, rows.len() as u32)?;
    }

    for (name, picks) in secondaries {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        let mut rows = vec![secondary_audit_header()];
        rows.extend(picks.iter().map(secondary_audit_row));
        write_rows(sheet, &rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

pub fn combined_header(secondary_names: &[String]) -> Vec<String> {
    let mut header = vec!["Fixture".to_string(), "Pick".to_string(), "AI_Confidence".to_string()];
    for name in secondary_names {
        header.push(format!("{name}_Confidence"));
    }
    header.push("Odds".to_string());
    header.push("Result".to_string());
    header
}

pub fn combined_row(record: &MergedRecord) -> Vec<String> {
    let mut row = vec![
        record.fixture.clone(),
        record.pick.clone(),
        opt_num(record.primary_confidence),
    ];
    for (_, confidence) in &record.secondary_confidence {
        row.push(opt_num(*confidence));
    }
    row.push(record.odds.clone().unwrap_or_default());
    row.push(record.result.clone().unwrap_or_default());
    row
}

fn primary_audit_header() -> Vec<String> {
    [
        "Fixture", "Pick", "XG", "Goals_Pick", "Confidence %", "Result", "Total", "Under",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn primary_audit_row(pick: &NormalizedPick) -> Vec<String> {
    vec![
        pick.fixture.clone(),
        pick.pick.clone(),
        opt_num(pick.expected_goals),
        opt_num(pick.goals_pick()),
        opt_num(pick.confidence_percent),
        pick.result.clone().unwrap_or_default(),
        pick.goal_total.map(|t| t.to_string()).unwrap_or_default(),
        pick.under()
            .map(|u| if u { "TRUE" } else { "FALSE" }.to_string())
            .unwrap_or_default(),
    ]
}

fn secondary_audit_header() -> Vec<String> {
    ["Fixture", "Pick", "Confidence %", "Odds", "Result"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn secondary_audit_row(pick: &NormalizedPick) -> Vec<String> {
    vec![
        pick.fixture.clone(),
        pick.pick.clone(),
        opt_num(pick.confidence_percent),
        pick.odds.clone().unwrap_or_default(),
        pick.result.clone().unwrap_or_default(),
    ]
}

/// `=AVERAGE(C2:C9)` style formula for a 0-based column and the 1-based index
/// of the last data row.
pub fn average_formula(col: u16, last_data_row: u32) -> String {
    let letter = col_letter(col);
    format!("=AVERAGE({letter}2:{letter}{last_data_row})")
}

/// The settled-picks scoreboard the audit sheet has always carried: counts of
/// Under hits/misses and the resulting hit percentage.
fn write_hit_rate_block(sheet: &mut Worksheet, last_data_row: u32) -> Result<()> {
    // Under lives in column H; the block goes two columns to its right.
    let under = col_letter(7);
    let counts = col_letter(9);
    let r1 = last_data_row + 1;
    let (r2, r3) = (r1 + 1, r1 + 2);

    sheet.write_formula(r1 - 1, 9, Formula::new(&format!("=COUNTIF({under}:{under},TRUE)")))?;
    sheet.write_formula(r2 - 1, 9, Formula::new(&format!("=COUNTIF({under}:{under},FALSE)")))?;
    sheet.write_formula(r3 - 1, 9, Formula::new(&format!("={counts}{r1}+{counts}{r2}")))?;
    sheet.write_formula(
        r1 - 1,
        10,
        Formula::new(&format!("=({counts}{r1}/{counts}{r3})*100")),
    )?;
    Ok(())
}

fn col_letter(col: u16) -> char {
    // The widest sheet here is well inside A..Z.
    (b'A' + col as u8) as char
}

fn opt_num(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
        None => String::new(),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
