//! Line editor for the interactive mode: tab completion of command words and
//! of their column/preset argument, plus persistent history.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};
use tracing::{debug, warn};

/// Completion table: command words and, per command, the words allowed as
/// its first argument.
pub struct CommandHelper {
    commands: Vec<&'static str>,
    arguments: BTreeMap<&'static str, Vec<&'static str>>,
}

impl CommandHelper {
    /// Build from `[command]` and `[command, argument]` patterns.
    pub fn new(patterns: &[Vec<&'static str>]) -> Self {
        let mut commands: Vec<&'static str> = Vec::new();
        let mut arguments: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();

        for pattern in patterns {
            let Some(command) = pattern.first() else {
                continue;
            };
            if !commands.contains(command) {
                commands.push(*command);
            }
            if let Some(argument) = pattern.get(1) {
                arguments.entry(*command).or_default().push(*argument);
            }
        }
        commands.sort_unstable();

        Self {
            commands,
            arguments,
        }
    }

    fn candidates(&self, previous: &[&str], word: &str) -> Vec<String> {
        let prefix = word.trim_start_matches('/').to_lowercase();
        let starts = |candidate: &str| candidate.to_lowercase().starts_with(&prefix);

        let mut out: Vec<String> = match previous {
            [] => {
                let slash = if word.starts_with('/') { "/" } else { "" };
                self.commands
                    .iter()
                    .copied()
                    .filter(|c| starts(*c))
                    .map(|c| format!("{}{} ", slash, c))
                    .collect()
            }
            [command] => {
                let command = command.trim_start_matches('/').to_lowercase();
                self.arguments
                    .get(command.as_str())
                    .map(|args| {
                        args.iter()
                            .copied()
                            .filter(|a| starts(*a))
                            .map(|a| format!("{} ", a))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        };

        out.sort();
        out.dedup();
        out
    }
}

impl Helper for CommandHelper {}
impl Validator for CommandHelper {}
impl Highlighter for CommandHelper {}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let word = before.rsplit(char::is_whitespace).next().unwrap_or("");
        let start = pos - word.len();
        let previous: Vec<&str> = before[..start].split_whitespace().collect();

        let pairs = self
            .candidates(&previous, word)
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();

        Ok((start, pairs))
    }
}

/// `rustyline::Editor` with the command completer and a history file.
pub struct Readline {
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Readline {
    /// `history_path` defaults to `~/.midcap/.history`.
    pub fn new(
        command_patterns: &[Vec<&'static str>],
        history_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandHelper::new(command_patterns)));

        let history_path = history_path.unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".midcap").join(".history")
        });

        if let Some(parent) = history_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("History disabled, cannot create {:?}: {}", parent, e);
            }
        }
        if let Err(e) = editor.load_history(&history_path) {
            debug!("No history loaded from {:?}: {}", history_path, e);
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        let line = self.editor.readline(prompt)?;
        if !line.trim().is_empty() {
            self.editor.add_history_entry(line.as_str())?;
            if let Err(e) = self.editor.append_history(&self.history_path) {
                debug!("Could not append to {:?}: {}", self.history_path, e);
            }
        }
        Ok(line)
    }

    /// Completions for `line` with the cursor at its end, paired with the
    /// replacement start index.
    pub fn completions(&self, line: &str) -> Vec<(usize, String)> {
        let Some(helper) = self.editor.helper() else {
            return Vec::new();
        };
        let ctx = Context::new(self.editor.history());
        match helper.complete(line, line.len(), &ctx) {
            Ok((start, pairs)) => pairs.into_iter().map(|p| (start, p.replacement)).collect(),
            Err(_) => Vec::new(),
        }
    }
}
