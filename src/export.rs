//! CSV export of the full holdings snapshot
//!
//! The export always covers the entire dataset in source order, whatever
//! filters or sort are active in the view. Values are written raw:
//! percentages stay fractions, no currency symbol, no grouping.

use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::MidcapError;
use crate::models::{Dataset, Holding};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const CSV_HEADER: &str = "Company Name,Mkt Val May %,Mkt Val Aug %,MV % Change,Qty % Change,MF May MV,MF Aug MV,MF May Qty,MF Aug Qty,Mkt Val May 2025,Mkt Val Aug 2025,Qty May 2025,Qty Aug 2025,Comment";

/// Result of writing an export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// `midcap-analysis-YYYY-MM-DD.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("midcap-analysis-{}.csv", date.format("%Y-%m-%d"))
}

/// Render the whole dataset as CSV text.
pub fn serialize(dataset: &Dataset) -> String {
    let mut csv = String::new();

    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for holding in dataset.iter() {
        csv.push_str(&render_row(holding));
        csv.push('\n');
    }

    csv
}

fn render_row(h: &Holding) -> String {
    [
        quoted(&h.name),
        number(h.market_value_pct_period_b),
        number(h.market_value_pct_period_a),
        number(h.market_value_pct_change),
        number(h.quantity_pct_change),
        count(h.fund_count_mv_period_b),
        count(h.fund_count_mv_period_a),
        count(h.fund_count_qty_period_b),
        count(h.fund_count_qty_period_a),
        number(h.market_value_period_b),
        number(h.market_value_period_a),
        number(h.quantity_period_b),
        number(h.quantity_period_a),
        quoted(h.comment.as_deref().unwrap_or("")),
    ]
    .join(",")
}

// Always quoted, even when empty; embedded quotes are doubled.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the export file into `dir`, named after `date`.
pub fn write_export(dataset: &Dataset, dir: &Path, date: NaiveDate) -> Result<ExportSummary> {
    let path = dir.join(export_file_name(date));
    let content = serialize(dataset);

    std::fs::create_dir_all(dir).map_err(|e| {
        MidcapError::ExportError(format!("creating directory {}: {}", dir.display(), e))
    })?;
    std::fs::write(&path, content).map_err(|e| {
        MidcapError::ExportError(format!("writing {}: {}", path.display(), e))
    })?;

    info!("Exported {} holdings to {:?}", dataset.len(), path);
    Ok(ExportSummary {
        path,
        rows: dataset.len(),
    })
}
