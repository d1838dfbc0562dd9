use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "midcap")]
#[command(
    version,
    about = "Midcap mutual fund holdings explorer (May vs Aug 2025)"
)]
#[command(
    long_about = "Slice a two-period snapshot of mutual fund midcap holdings with column filters (>=5, <0.5, 12, ...), quick filter presets (new entries, exits, increases, decreases), and export the full snapshot to CSV."
)]
pub struct Cli {
    /// Holdings snapshot file (JSON array); overrides `data_path` in the config
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Config file (default: <config dir>/midcap/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the holdings table with optional preset, filters and sort
    View {
        /// Quick filter preset (top-holdings-periodA, top-holdings-periodB,
        /// increase, decrease, new-entries, exits, clear)
        #[arg(short, long)]
        preset: Option<String>,

        /// Column filter as COLUMN=EXPR (e.g. mv-pct-a=>=5, name=dixon); repeatable
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Sort as COLUMN[:asc|desc] (default direction: desc)
        #[arg(short, long)]
        sort: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (10, 25, 50 or 100)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Export the full snapshot to midcap-analysis-<date>.csv
    Export {
        /// Output directory (default: `export_dir` from config)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Show per-period totals of market value and quantity
    Totals,

    /// List the quick filter presets
    Presets,

    /// Describe every column
    Legend,

    /// Launch interactive mode
    Interactive,
}
