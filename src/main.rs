use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use midcap::cli::runner::to_internal_commands;
use midcap::cli::{Cli, Commands};
use midcap::config::Config;
use midcap::dispatcher::{dispatch_command, Session};
use midcap::filters::PAGE_SIZES;
use midcap::models::Dataset;
use midcap::ui;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config);

    // No subcommand behaves like a bare `view`
    let command = cli.command.unwrap_or(Commands::View {
        preset: None,
        filters: Vec::new(),
        sort: None,
        page: 1,
        page_size: None,
    });

    let dataset = match cli.data.as_ref().or(config.data_path.as_ref()) {
        Some(path) => Dataset::load(path)
            .with_context(|| format!("Failed to load holdings snapshot {}", path.display()))?,
        None => {
            debug!("No snapshot configured, starting with an empty dataset");
            Dataset::default()
        }
    };

    let mut session = Session::new(dataset, &config);

    if let Commands::View {
        page_size: Some(size),
        ..
    } = &command
    {
        if !PAGE_SIZES.contains(size) {
            bail!("--page-size must be one of {:?}, got {}", PAGE_SIZES, size);
        }
        session.page_size = *size;
    }

    if matches!(command, Commands::Interactive) {
        info!("Starting interactive mode");
        return ui::launch_interactive(session);
    }

    for internal in to_internal_commands(&command)? {
        dispatch_command(internal, &mut session, cli.json)?;
    }

    Ok(())
}

/// Log to stderr; RUST_LOG wins over the configured level.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
