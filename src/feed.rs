use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http_client::http_client;
use crate::picks::RawPick;

/// The scraping layer dumps each site's rows as JSON — either a bare array of
/// rows or an object with a `rows` field (newer dumps also carry the source
/// name and scrape time, which we ignore here).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotDoc {
    Rows(Vec<RawPick>),
    Wrapped {
        #[serde(default)]
        rows: Vec<RawPick>,
    },
}

/// Parse one snapshot body. An empty or `"null"` body is an empty batch, not
/// an error: the scraper writes those when a site listed nothing that day.
pub fn parse_snapshot_json(raw: &str) -> Result<Vec<RawPick>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let doc: SnapshotDoc = serde_json::from_str(trimmed).context("invalid snapshot json")?;
    Ok(match doc {
        SnapshotDoc::Rows(rows) => rows,
        SnapshotDoc::Wrapped { rows } => rows,
    })
}

/// Load a snapshot from a filesystem path or an http(s) URL. A missing file
/// is an empty batch (the day's scrape may simply not have run for that
/// source); anything else unreadable is a real error.
pub fn load_snapshot(location: &str) -> Result<Vec<RawPick>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let client = http_client()?;
        let resp = client
            .get(location)
            .send()
            .with_context(|| format!("snapshot request failed: {location}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading snapshot body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status} fetching {location}"));
        }
        return parse_snapshot_json(&body);
    }

    let path = Path::new(location);
    if !path.exists() {
        eprintln!("[feed] no snapshot at {location}, treating as empty batch");
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {location}"))?;
    parse_snapshot_json(&raw)
}
