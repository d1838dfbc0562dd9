//! Command parsing and routing layer
//!
//! Provides a simple, custom command parser for interactive readline input.
//! The clap CLI converts its subcommands into the same `Command` values (see
//! `cli::runner`), so both front ends share one dispatcher.

use std::path::PathBuf;

use crate::filters::presets::PresetId;
use crate::filters::{SortDirection, SortSpec};
use crate::models::Column;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the current view: `show [page]`
    Show { page: usize },
    /// Set a column filter: `filter <column> <expr>`
    Filter { column: Column, expr: String },
    /// Remove one column filter: `unfilter <column>`
    Unfilter { column: Column },
    /// Sort the view: `sort <column> [asc|desc]`
    Sort { column: Column, direction: SortDirection },
    /// Apply a quick filter preset: `preset <id>`
    Preset { id: PresetId },
    /// Deactivate the quick filter: `clear`
    Clear,
    /// Drop the quick filter and every column filter: `reset`
    Reset,
    /// Export the full snapshot: `export [dir]`
    Export { dir: Option<PathBuf> },
    /// Per-period totals: `totals`
    Totals,
    /// Column descriptions: `legend`
    Legend,
    /// Preset catalog: `presets`
    Presets,
    /// Show help
    Help,
    /// Exit/quit
    Exit,
}

/// Error type for command parsing
#[derive(Debug, Clone)]
pub struct CommandParseError {
    pub message: String,
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandParseError {}

fn parse_error(message: impl Into<String>) -> CommandParseError {
    CommandParseError {
        message: message.into(),
    }
}

pub fn parse_column(s: &str) -> Result<Column, CommandParseError> {
    s.parse::<Column>().map_err(|_| {
        let known: Vec<&str> = Column::ALL.iter().map(|c| c.as_str()).collect();
        parse_error(format!(
            "Unknown column '{}'. Columns: {}",
            s,
            known.join(", ")
        ))
    })
}

pub fn parse_preset(s: &str) -> Result<PresetId, CommandParseError> {
    s.parse::<PresetId>().map_err(|_| {
        let known: Vec<&str> = PresetId::ALL.iter().map(|p| p.as_str()).collect();
        parse_error(format!(
            "Unknown preset '{}'. Presets: {}",
            s,
            known.join(", ")
        ))
    })
}

/// Parse `COLUMN[:asc|desc]`; the direction defaults to descending.
pub fn parse_sort(s: &str) -> Result<SortSpec, CommandParseError> {
    let (column, direction) = match s.split_once(':') {
        Some((c, d)) => (c, Some(d)),
        None => (s, None),
    };
    let column = parse_column(column)?;
    let direction = match direction {
        Some(d) => d
            .parse::<SortDirection>()
            .map_err(|_| parse_error(format!("Invalid sort direction '{}'. Use asc or desc", d)))?,
        None => SortDirection::Descending,
    };
    Ok(SortSpec::new(column, direction))
}

/// Parse `COLUMN=EXPR`. Only the first `=` separates, so `mv-pct-a==5`
/// filters with `=5`.
pub fn parse_column_filter(s: &str) -> Result<(Column, String), CommandParseError> {
    let (column, expr) = s
        .split_once('=')
        .ok_or_else(|| parse_error(format!("Invalid filter '{}'. Use COLUMN=EXPR", s)))?;
    Ok((parse_column(column)?, expr.trim().to_string()))
}

/// Parse a command string into a Command enum
///
/// A leading slash is accepted, so `/preset exits` and `preset exits` are
/// the same command.
pub fn parse_command(input: &str) -> Result<Command, CommandParseError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(parse_error("Empty command. Type `/help` for commands."));
    }

    let input = input.strip_prefix('/').unwrap_or(input);

    let (cmd, rest) = match input.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (input, ""),
    };

    match cmd.to_lowercase().as_str() {
        "show" | "view" => {
            let page = if rest.is_empty() {
                1
            } else {
                rest.parse::<usize>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| parse_error(format!("Invalid page '{}'", rest)))?
            };
            Ok(Command::Show { page })
        }
        "filter" => {
            let (column, expr) = match rest.split_once(char::is_whitespace) {
                Some((c, e)) => (c, e.trim()),
                None => (rest, ""),
            };
            if column.is_empty() {
                return Err(parse_error(
                    "filter requires a column. Usage: filter <column> <expr>",
                ));
            }
            let column = parse_column(column)?;
            if expr.is_empty() {
                // An empty box means no filter on that column
                return Ok(Command::Unfilter { column });
            }
            Ok(Command::Filter {
                column,
                expr: expr.to_string(),
            })
        }
        "unfilter" => {
            if rest.is_empty() {
                return Err(parse_error("unfilter requires a column. Usage: unfilter <column>"));
            }
            Ok(Command::Unfilter {
                column: parse_column(rest)?,
            })
        }
        "sort" => {
            let mut parts = rest.split_whitespace();
            let column = parts.next().ok_or_else(|| {
                parse_error("sort requires a column. Usage: sort <column> [asc|desc]")
            })?;
            let column = parse_column(column)?;
            let direction = match parts.next() {
                Some(d) => d.parse::<SortDirection>().map_err(|_| {
                    parse_error(format!("Invalid sort direction '{}'. Use asc or desc", d))
                })?,
                None => SortDirection::Descending,
            };
            Ok(Command::Sort { column, direction })
        }
        "preset" => {
            if rest.is_empty() {
                return Err(parse_error("preset requires an id. Type `presets` to list them"));
            }
            Ok(Command::Preset {
                id: parse_preset(rest)?,
            })
        }
        "clear" => Ok(Command::Clear),
        "reset" => Ok(Command::Reset),
        "export" => Ok(Command::Export {
            dir: (!rest.is_empty()).then(|| PathBuf::from(rest)),
        }),
        "totals" => Ok(Command::Totals),
        "legend" => Ok(Command::Legend),
        "presets" => Ok(Command::Presets),
        "help" | "h" | "?" => Ok(Command::Help),
        "exit" | "quit" | "q" => Ok(Command::Exit),
        _ => Err(parse_error(format!(
            "Unknown command: {}. Type `/help` for commands.",
            cmd
        ))),
    }
}
