use anyhow::Result;

use crate::cli::Commands;
use crate::commands::{self as cmd, Command};

/// Convert clap `Commands` into the internal `commands::Command` sequence
/// applied to a fresh session. Returns an empty list for `interactive`,
/// which is handled by the caller, and Err on parse errors (unknown
/// column, bad sort spec).
pub fn to_internal_commands(c: &Commands) -> Result<Vec<Command>> {
    match c {
        Commands::View {
            preset,
            filters,
            sort,
            page,
            page_size: _,
        } => {
            let mut commands = Vec::new();

            if let Some(p) = preset {
                commands.push(Command::Preset {
                    id: cmd::parse_preset(p)?,
                });
            }

            for f in filters {
                let (column, expr) = cmd::parse_column_filter(f)?;
                commands.push(Command::Filter { column, expr });
            }

            // An explicit sort wins over the one forced by the preset
            if let Some(s) = sort {
                let spec = cmd::parse_sort(s)?;
                commands.push(Command::Sort {
                    column: spec.column,
                    direction: spec.direction,
                });
            }

            commands.push(Command::Show {
                page: (*page).max(1),
            });
            Ok(commands)
        }

        Commands::Export { out_dir } => Ok(vec![Command::Export {
            dir: out_dir.clone(),
        }]),

        Commands::Totals => Ok(vec![Command::Totals]),
        Commands::Presets => Ok(vec![Command::Presets]),
        Commands::Legend => Ok(vec![Command::Legend]),
        Commands::Interactive => Ok(Vec::new()),
    }
}
