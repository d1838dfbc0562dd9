//! Command dispatcher shared by the one-shot CLI and the interactive mode.
//!
//! A `Session` owns the loaded snapshot and the single `FilterState`; every
//! command either replaces that state or renders something from it.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::formatters::{self, PageInfo};
use crate::commands::Command;
use crate::config::Config;
use crate::export::write_export;
use crate::filters::presets::PresetId;
use crate::filters::{paginate, FilterState, SortSpec};
use crate::models::Dataset;
use crate::reports::ValidationTotals;

/// Loaded snapshot plus the live view state
#[derive(Debug)]
pub struct Session {
    pub dataset: Dataset,
    pub state: FilterState,
    pub page_size: usize,
    pub export_dir: PathBuf,
}

impl Session {
    pub fn new(dataset: Dataset, config: &Config) -> Self {
        Self {
            dataset,
            state: FilterState::initial(),
            page_size: config.page_size,
            export_dir: config.export_dir.clone(),
        }
    }

    /// Replace the filter state with the preset applied.
    pub fn apply_preset(&mut self, preset: PresetId) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply_preset(preset);
    }

    /// Rows matching the current state
    pub fn matching(&self) -> usize {
        self.state.view(&self.dataset).len()
    }
}

/// Route a parsed command to its handler
pub fn dispatch_command(command: Command, session: &mut Session, json_output: bool) -> Result<()> {
    match command {
        Command::Show { page } => dispatch_show(session, page, json_output),
        Command::Filter { column, expr } => {
            session.state.set_column_filter(column, expr);
            report_rows(session, json_output);
            Ok(())
        }
        Command::Unfilter { column } => {
            session.state.remove_column_filter(column);
            report_rows(session, json_output);
            Ok(())
        }
        Command::Sort { column, direction } => {
            session
                .state
                .set_sort(Some(SortSpec::new(column, direction)));
            Ok(())
        }
        Command::Preset { id } => {
            session.apply_preset(id);
            if !json_output {
                match session.state.active_preset() {
                    Some(active) => println!(
                        "{} Quick filter: {} ({} rows)",
                        "✓".green().bold(),
                        active.label().cyan(),
                        session.matching()
                    ),
                    None => println!("{} Quick filter cleared", "✓".green().bold()),
                }
            }
            Ok(())
        }
        Command::Clear => {
            session.apply_preset(PresetId::Clear);
            if !json_output {
                println!("{} Quick filter cleared", "✓".green().bold());
            }
            Ok(())
        }
        Command::Reset => {
            session.apply_preset(PresetId::Clear);
            session.state.clear_column_filters();
            if !json_output {
                println!("{} All filters cleared", "✓".green().bold());
            }
            Ok(())
        }
        Command::Export { dir } => dispatch_export(session, dir, json_output),
        Command::Totals => {
            let totals = ValidationTotals::from_dataset(&session.dataset);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                print!("{}", formatters::format_totals(&totals, session.dataset.len()));
            }
            Ok(())
        }
        Command::Legend => {
            print!("{}", formatters::format_legend());
            Ok(())
        }
        Command::Presets => {
            print!(
                "{}",
                formatters::format_presets(session.state.active_preset())
            );
            Ok(())
        }
        Command::Help => {
            println!("Help: midcap <command> [options]");
            println!("\nInteractive commands:");
            println!("  show [page]                - Show the current view");
            println!("  filter <column> <expr>     - Filter a column (>=5, <0.5, =12, 12, text)");
            println!("  unfilter <column>          - Remove a column filter");
            println!("  sort <column> [asc|desc]   - Sort the view");
            println!("  preset <id>                - Apply a quick filter (see `presets`)");
            println!("  clear                      - Deactivate the quick filter");
            println!("  reset                      - Clear quick filter and column filters");
            println!("  export [dir]               - Export the full snapshot to CSV");
            println!("  totals                     - Show validation totals");
            println!("  legend                     - Describe every column");
            println!("  presets                    - List quick filter presets");
            println!("  help                       - Show this help");
            println!("  exit                       - Exit application");
            Ok(())
        }
        // The interactive loop stops before dispatching Exit
        Command::Exit => Ok(()),
    }
}

fn report_rows(session: &Session, json_output: bool) {
    if !json_output {
        println!(
            "{} {} of {} companies match",
            "✓".green().bold(),
            session.matching(),
            session.dataset.len()
        );
    }
}

fn dispatch_show(session: &Session, page: usize, json_output: bool) -> Result<()> {
    if session.dataset.is_empty() && !json_output {
        print!("{}", formatters::format_empty_dataset());
        return Ok(());
    }

    let view = session.state.view(&session.dataset);
    let rows = paginate(&view, page, session.page_size);
    let info = PageInfo {
        page,
        page_size: session.page_size,
        matching: view.len(),
        total: session.dataset.len(),
    };

    if json_output {
        println!("{}", formatters::format_view_json(rows, info));
    } else {
        print!(
            "{}",
            formatters::format_holdings_table(rows, &session.state, info)
        );
    }
    Ok(())
}

fn dispatch_export(session: &Session, dir: Option<PathBuf>, json_output: bool) -> Result<()> {
    let dir = dir.unwrap_or_else(|| session.export_dir.clone());
    let date = Local::now().date_naive();

    info!("Exporting {} holdings to {:?}", session.dataset.len(), dir);
    let summary = write_export(&session.dataset, &dir, date)?;

    if json_output {
        let payload = serde_json::json!({
            "path": summary.path.display().to_string(),
            "rows": summary.rows,
            "contentType": crate::export::CSV_CONTENT_TYPE,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", formatters::format_export_done(&summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::SortDirection;
    use crate::models::{Column, Holding};

    fn session() -> Session {
        let holdings = vec![
            Holding {
                quantity_pct_change: Some(0.2),
                ..Holding::new("Alpha")
            },
            Holding {
                quantity_pct_change: Some(-0.4),
                ..Holding::new("Beta")
            },
        ];
        Session::new(Dataset::new(holdings), &Config::default())
    }

    #[test]
    fn test_session_starts_with_initial_sort() {
        let s = session();
        assert_eq!(s.state, FilterState::initial());
        assert_eq!(s.page_size, 10);
    }

    #[test]
    fn test_preset_commands_replace_state() {
        let mut s = session();
        dispatch_command(Command::Preset { id: PresetId::Increase }, &mut s, true).unwrap();
        dispatch_command(Command::Preset { id: PresetId::Decrease }, &mut s, true).unwrap();
        assert_eq!(s.state.active_preset(), Some(PresetId::Decrease));
        assert_eq!(s.matching(), 1);

        dispatch_command(Command::Clear, &mut s, true).unwrap();
        assert_eq!(s.state.active_preset(), None);
        assert_eq!(s.matching(), 2);
    }

    #[test]
    fn test_reset_drops_column_filters() {
        let mut s = session();
        dispatch_command(
            Command::Filter {
                column: Column::Name,
                expr: "alp".to_string(),
            },
            &mut s,
            true,
        )
        .unwrap();
        assert_eq!(s.matching(), 1);
        dispatch_command(Command::Reset, &mut s, true).unwrap();
        assert!(s.state.column_filters().is_empty());
        assert_eq!(s.matching(), 2);
    }

    #[test]
    fn test_sort_command() {
        let mut s = session();
        dispatch_command(
            Command::Sort {
                column: Column::QuantityPctChange,
                direction: SortDirection::Ascending,
            },
            &mut s,
            true,
        )
        .unwrap();
        let names: Vec<&str> = s
            .state
            .view(&s.dataset)
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn test_export_ignores_active_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.apply_preset(PresetId::Decrease);
        s.state.set_column_filter(Column::Name, "nothing matches this");
        assert_eq!(s.matching(), 0);

        dispatch_command(
            Command::Export {
                dir: Some(dir.path().to_path_buf()),
            },
            &mut s,
            true,
        )
        .unwrap();

        let file = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let content = std::fs::read_to_string(file).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
