//! Interactive mode: a readline REPL over one `Session`.

pub mod readline;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;

use crate::commands::{parse_command, Command};
use crate::dispatcher::{dispatch_command, Session};
use crate::filters::presets::PresetId;
use crate::models::Column;

const SIMPLE_COMMANDS: &[&str] = &[
    "show", "clear", "reset", "export", "totals", "legend", "presets", "help", "exit", "quit",
];

/// Completion patterns: bare commands, then `<command> <column|preset>`.
fn command_patterns() -> Vec<Vec<&'static str>> {
    let mut patterns: Vec<Vec<&'static str>> =
        SIMPLE_COMMANDS.iter().map(|c| vec![*c]).collect();

    for column in Column::ALL {
        for cmd in ["filter", "unfilter", "sort"] {
            patterns.push(vec![cmd, column.as_str()]);
        }
    }
    for preset in PresetId::ALL {
        patterns.push(vec!["preset", preset.as_str()]);
    }
    patterns
}

/// Launch the interactive REPL.
pub fn launch_interactive(mut session: Session) -> Result<()> {
    println!("{}", "Midcap - Interactive Mode".bold());
    println!(
        "{} holdings loaded. Type {} for help, {} to exit\n",
        session.dataset.len(),
        "/help".cyan(),
        "/exit".cyan()
    );

    let mut rl = readline::Readline::new(&command_patterns(), None)?;

    loop {
        match rl.readline("midcap> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Ok(Command::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(cmd) => {
                        if let Err(e) = dispatch_command(cmd, &mut session, false) {
                            eprintln!("{} {:#}", "Error:".red().bold(), e);
                        }
                    }
                    Err(e) => {
                        eprintln!("{} {}", "Parse error:".yellow().bold(), e.message);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_cover_columns_and_presets() {
        let patterns = command_patterns();
        assert!(patterns.contains(&vec!["filter", "mv-pct-a"]));
        assert!(patterns.contains(&vec!["sort", "qty-change"]));
        assert!(patterns.contains(&vec!["preset", "new-entries"]));
        assert!(patterns.contains(&vec!["totals"]));
    }
}
