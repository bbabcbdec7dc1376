use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use tipfuse::export;
use tipfuse::feed;
use tipfuse::matching::TokenContainment;
use tipfuse::normalize::SourceRules;
use tipfuse::pipeline::{self, SourceBatch};
use tipfuse::report;

const PRIMARY_SOURCE: &str = "AI-Goalie";
const SECONDARY_SOURCES: [&str; 2] = ["OLBG", "Oddspedia"];

struct RunConfig {
    date: NaiveDate,
    tips_dir: PathBuf,
    out_dir: PathBuf,
}

impl RunConfig {
    fn from_env() -> Result<Self> {
        let date = match env::var("REPORT_DATE") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .context("REPORT_DATE must be YYYY-MM-DD")?,
            Err(_) => Local::now().date_naive(),
        };
        let tips_dir = PathBuf::from(env::var("TIPS_DIR").unwrap_or_else(|_| "tips".to_string()));
        let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap_or_else(|_| "site".to_string()));
        Ok(Self {
            date,
            tips_dir,
            out_dir,
        })
    }

    /// Snapshot location for one source: an explicit `<NAME>_SNAPSHOT` env
    /// override (path or URL), else `{tips_dir}/{dd}_{name}.json`.
    fn snapshot_location(&self, name: &str) -> String {
        let var = format!("{}_SNAPSHOT", name.to_uppercase().replace('-', "_"));
        if let Ok(explicit) = env::var(&var) {
            let explicit = explicit.trim().to_string();
            if !explicit.is_empty() {
                return explicit;
            }
        }
        let file = format!("{}_{}.json", self.date.format("%d"), name.to_lowercase());
        self.tips_dir.join(file).to_string_lossy().into_owned()
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = RunConfig::from_env()?;

    let primary_rows = feed::load_snapshot(&cfg.snapshot_location(PRIMARY_SOURCE))?;
    let primary = SourceBatch::new(PRIMARY_SOURCE, primary_rows, SourceRules::primary());

    let mut secondaries = Vec::new();
    for name in SECONDARY_SOURCES {
        let rows = feed::load_snapshot(&cfg.snapshot_location(name))?;
        secondaries.push(SourceBatch::new(name, rows, SourceRules::secondary()));
    }

    let out = pipeline::run(primary, secondaries, &TokenContainment);

    for stats in &out.report.sources {
        println!(
            "[{}] scraped {}, kept {}, skipped {}",
            stats.name, stats.scraped, stats.kept, stats.skipped
        );
    }
    println!(
        "Found {} common picks ({} primary rows had no secondary match).",
        out.report.primary_matched, out.report.primary_unmatched
    );

    let day_dir = cfg.out_dir.join(cfg.date.format("%Y-%m-%d").to_string());
    std::fs::create_dir_all(&day_dir)
        .with_context(|| format!("creating {}", day_dir.display()))?;

    let dd = cfg.date.format("%d");
    let secondary_names: Vec<String> = SECONDARY_SOURCES.iter().map(|s| s.to_string()).collect();

    let combined_path = day_dir.join(format!("{dd}_combined_confidence.xlsx"));
    export::write_combined_workbook(&combined_path, &out.records, &secondary_names)?;
    println!("Results saved to {}", combined_path.display());

    let audit_path = day_dir.join(format!("{dd}_sources_full.xlsx"));
    export::write_audit_workbook(
        &audit_path,
        PRIMARY_SOURCE,
        &out.primary_full,
        &out.secondary_full,
    )?;

    report::write_site(&cfg.out_dir, cfg.date, &out.records, &secondary_names)?;
    println!("Site updated under {}", cfg.out_dir.display());

    Ok(())
}
