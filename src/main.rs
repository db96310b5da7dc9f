mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use guest_loans::{logging, Config, RentalService};

/// Track items lent to hotel guests for one front-desk session
#[derive(Debug, Parser)]
#[command(name = "guest-loans", version, about)]
struct Args {
    /// JSON config file (items, seed aliases, loan policy, logging)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Roster to import before the shell starts (.xml or .csv)
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Log filter, e.g. "guest_loans=debug" (RUST_LOG takes precedence)
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(filter) = args.log_filter {
        config.logging.filter = filter;
    }
    logging::init_tracing(&config.logging)?;

    let service = RentalService::from_config(&config).context("invalid seed aliases in config")?;

    if let Some(roster) = &args.roster {
        let count = service
            .import_roster_file(roster)
            .with_context(|| format!("failed to import roster {}", roster.display()))?;
        println!("imported {} guest(s) from {}", count, roster.display());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell::Shell::new(&service).run(stdin.lock(), &mut stdout)?;

    tracing::info!(loans = service.list_loans().len(), "session ended");
    Ok(())
}
