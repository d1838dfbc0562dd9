//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of filtering and export from presentation.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::annotate::is_highlighted;
use crate::export::ExportSummary;
use crate::filters::presets::PresetId;
use crate::filters::{page_count, FilterState};
use crate::models::{Column, Holding};
use crate::reports::ValidationTotals;
use crate::utils::{format_count, format_percent, format_quantity, format_rupees, truncate_name};

/// Where the displayed rows sit in the full view
#[derive(Debug, Clone, Copy)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub matching: usize,
    pub total: usize,
}

/// Format one page of the view for JSON output
pub fn format_view_json(rows: &[&Holding], info: PageInfo) -> String {
    #[derive(Serialize)]
    struct JsonView<'a> {
        page: usize,
        pages: usize,
        matching: usize,
        total: usize,
        rows: Vec<JsonRow<'a>>,
    }

    #[derive(Serialize)]
    struct JsonRow<'a> {
        #[serde(flatten)]
        holding: &'a Holding,
        highlighted: bool,
    }

    let view = JsonView {
        page: info.page,
        pages: page_count(info.matching, info.page_size),
        matching: info.matching,
        total: info.total,
        rows: rows
            .iter()
            .map(|h| JsonRow {
                holding: h,
                highlighted: is_highlighted(h),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&view)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

// Green for growth, red for decline, "N/A" when there is nothing to compare
fn colored_change(value: Option<f64>) -> String {
    let text = format_percent(value, "N/A");
    match value {
        Some(v) if v >= 0.0 => text.green().to_string(),
        Some(_) => text.red().to_string(),
        None => text,
    }
}

/// Format a page of holdings for terminal table output
pub fn format_holdings_table(rows: &[&Holding], state: &FilterState, info: PageInfo) -> String {
    let mut output = String::new();

    output.push_str(&format_state_line(state));

    if rows.is_empty() {
        output.push_str(&format!(
            "\n{} No holdings match the current filters\n",
            "ℹ".blue().bold()
        ));
        output.push_str(&format_counter(info));
        return output;
    }

    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Company Name")]
        name: String,
        #[tabled(rename = "Comment")]
        comment: String,
        #[tabled(rename = "Aug %")]
        pct_a: String,
        #[tabled(rename = "May %")]
        pct_b: String,
        #[tabled(rename = "MV % Chg")]
        mv_change: String,
        #[tabled(rename = "Qty % Chg")]
        qty_change: String,
        #[tabled(rename = "MF Aug MV")]
        funds_mv_a: String,
        #[tabled(rename = "MF May MV")]
        funds_mv_b: String,
        #[tabled(rename = "MF Aug Qty")]
        funds_qty_a: String,
        #[tabled(rename = "MF May Qty")]
        funds_qty_b: String,
        #[tabled(rename = "Mkt Val Aug")]
        mv_a: String,
        #[tabled(rename = "Mkt Val May")]
        mv_b: String,
        #[tabled(rename = "Qty Aug")]
        qty_a: String,
        #[tabled(rename = "Qty May")]
        qty_b: String,
    }

    let table_rows: Vec<HoldingRow> = rows
        .iter()
        .map(|h| {
            let name = truncate_name(&h.name);
            let comment = h.comment.as_deref().unwrap_or("").trim().to_string();
            let (name, comment) = if is_highlighted(h) {
                (
                    name.yellow().bold().to_string(),
                    comment.black().on_yellow().to_string(),
                )
            } else {
                (name, comment)
            };

            HoldingRow {
                name,
                comment,
                pct_a: format_percent(h.market_value_pct_period_a, ""),
                pct_b: format_percent(h.market_value_pct_period_b, ""),
                mv_change: colored_change(h.market_value_pct_change),
                qty_change: colored_change(h.quantity_pct_change),
                funds_mv_a: format_count(h.fund_count_mv_period_a),
                funds_mv_b: format_count(h.fund_count_mv_period_b),
                funds_qty_a: format_count(h.fund_count_qty_period_a),
                funds_qty_b: format_count(h.fund_count_qty_period_b),
                mv_a: format_rupees(h.market_value_period_a),
                mv_b: format_rupees(h.market_value_period_b),
                qty_a: format_quantity(h.quantity_period_a),
                qty_b: format_quantity(h.quantity_period_b),
            }
        })
        .collect();

    let mut table = Table::new(&table_rows);
    table.with(Style::modern());
    // Right-align all columns except Company Name (0) and Comment (1)
    table.modify(Columns::new(2..), Alignment::right());

    output.push('\n');
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&format_counter(info));

    output
}

fn format_counter(info: PageInfo) -> String {
    format!(
        "\nDisplaying {} of {} companies (page {} of {})\n",
        info.matching,
        info.total,
        info.page,
        page_count(info.matching, info.page_size)
    )
}

/// One line summarising preset, sort and column filters
pub fn format_state_line(state: &FilterState) -> String {
    let preset = state
        .active_preset()
        .map(|p| p.label().cyan().bold().to_string())
        .unwrap_or_else(|| "none".dimmed().to_string());
    let sort = state
        .sort()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut line = format!("\n{} Quick filter: {}  Sort: {}", "📊".cyan(), preset, sort);

    if !state.column_filters().is_empty() {
        let filters: Vec<String> = state
            .column_filters()
            .iter()
            .map(|(column, text)| format!("{} '{}'", column, text))
            .collect();
        line.push_str(&format!("  Filters: {}", filters.join(", ")));
    }

    line.push('\n');
    line
}

/// Format the preset catalog, marking the active one
pub fn format_presets(active: Option<PresetId>) -> String {
    #[derive(Tabled)]
    struct PresetRow {
        #[tabled(rename = "")]
        marker: String,
        #[tabled(rename = "Preset")]
        id: String,
        #[tabled(rename = "Description")]
        label: String,
        #[tabled(rename = "Sort")]
        sort: String,
        #[tabled(rename = "Keeps rows where")]
        predicate: String,
    }

    let rows: Vec<PresetRow> = PresetId::ALL
        .iter()
        .map(|id| {
            let outcome = id.apply();
            PresetRow {
                marker: if Some(*id) == active {
                    "●".green().to_string()
                } else {
                    String::new()
                },
                id: id.as_str().to_string(),
                label: id.label().to_string(),
                sort: outcome
                    .sort
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unchanged".to_string()),
                predicate: outcome
                    .predicate
                    .map(|p| p.describe().to_string())
                    .unwrap_or_else(|| "all".to_string()),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}

/// Format the column legend
pub fn format_legend() -> String {
    #[derive(Tabled)]
    struct LegendRow {
        #[tabled(rename = "Column")]
        id: &'static str,
        #[tabled(rename = "Title")]
        title: &'static str,
        #[tabled(rename = "Description")]
        description: &'static str,
    }

    let rows: Vec<LegendRow> = Column::ALL
        .iter()
        .map(|c| LegendRow {
            id: c.as_str(),
            title: c.title(),
            description: c.description(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    format!("\n{} Column Legend\n\n{}\n", "📖".cyan().bold(), table)
}

/// Format the validation totals
pub fn format_totals(totals: &ValidationTotals, holdings: usize) -> String {
    let mut output = format!(
        "\n{} Validation totals ({} holdings)\n\n",
        "🧮".cyan().bold(),
        holdings
    );
    let header = format!("{:<22} {:>20} {:>20}", "", "May 2025", "Aug 2025");
    output.push_str(&format!("{}\n", header.bold()));
    output.push_str(&format!(
        "{:<22} {:>20} {:>20}\n",
        "Market value (₹)",
        ValidationTotals::display_market_value(totals.market_value_period_b),
        ValidationTotals::display_market_value(totals.market_value_period_a)
    ));
    output.push_str(&format!(
        "{:<22} {:>20} {:>20}\n",
        "Quantity",
        ValidationTotals::display_quantity(totals.quantity_period_b),
        ValidationTotals::display_quantity(totals.quantity_period_a)
    ));
    output
}

/// Confirmation after writing the export file
pub fn format_export_done(summary: &ExportSummary) -> String {
    format!(
        "{} CSV file written: {} ({} records)\n",
        "✓".green().bold(),
        summary.path.display(),
        summary.rows
    )
}

/// Format empty dataset message
pub fn format_empty_dataset() -> String {
    format!(
        "{} No holdings loaded\nPoint {} at a snapshot with --data <file> or `data_path` in the config\n",
        "ℹ".blue().bold(),
        "midcap".bold()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(matching: usize) -> PageInfo {
        PageInfo {
            page: 1,
            page_size: 10,
            matching,
            total: 3,
        }
    }

    #[test]
    fn test_empty_dataset_message() {
        let msg = format_empty_dataset();
        assert!(msg.contains("No holdings loaded"));
        assert!(msg.contains("--data"));
    }

    #[test]
    fn test_table_contains_formatted_values() {
        colored::control::set_override(false);
        let h = Holding {
            comment: Some("Bonus".to_string()),
            market_value_pct_period_a: Some(0.031),
            quantity_pct_change: None,
            market_value_period_a: Some(83105.0),
            ..Holding::new("Dixon Tech")
        };
        let out = format_holdings_table(&[&h], &FilterState::initial(), info(1));
        assert!(out.contains("Dixon Tech"));
        assert!(out.contains("3.1%"));
        assert!(out.contains("N/A"));
        assert!(out.contains("₹83,105"));
        assert!(out.contains("Displaying 1 of 3 companies"));
        assert!(out.contains("mv-pct-a:desc"));
    }

    #[test]
    fn test_table_reports_no_match() {
        colored::control::set_override(false);
        let out = format_holdings_table(&[], &FilterState::new(), info(0));
        assert!(out.contains("No holdings match"));
        assert!(out.contains("Displaying 0 of 3 companies"));
    }

    #[test]
    fn test_state_line_lists_filters() {
        colored::control::set_override(false);
        let mut state = FilterState::new().apply_preset(PresetId::Exits);
        state.set_column_filter(Column::MarketValuePctPeriodB, ">=1");
        let line = format_state_line(&state);
        assert!(line.contains("Exits"));
        assert!(line.contains("mv-pct-b '>=1'"));
    }

    #[test]
    fn test_presets_table_lists_catalog() {
        colored::control::set_override(false);
        let out = format_presets(Some(PresetId::Decrease));
        for id in PresetId::ALL {
            assert!(out.contains(id.as_str()));
        }
        assert!(out.contains("quantityPctChange < 0"));
        assert!(out.contains("●"));
    }

    #[test]
    fn test_legend_lists_every_column() {
        let out = format_legend();
        for c in Column::ALL {
            assert!(out.contains(c.as_str()));
        }
    }

    #[test]
    fn test_json_view_marks_highlighted_rows() {
        let h = Holding {
            comment: Some("Split".to_string()),
            ..Holding::new("Persistent")
        };
        let out = format_view_json(&[&h], info(1));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["matching"], 1);
        assert_eq!(value["rows"][0]["name"], "Persistent");
        assert_eq!(value["rows"][0]["highlighted"], true);
        assert!(value["rows"][0]["quantityPctChange"].is_null());
    }
}
