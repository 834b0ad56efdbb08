#![deny(unsafe_code)]

mod cli;

use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use cli::VerbosityLevel;
use tablestate::config::PAGE_SIZE_KEY;
use tablestate::net::Location;
use tablestate::{Config, ReportLevel, Runner, Step, TableConfig};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.verbose.filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut table = match &args.config {
        Some(path) => TableConfig::from_file(path)?,
        None => TableConfig::new("records").with_filter_keys(&["status"]),
    };
    if let Some(key) = args.storage_key {
        table.storage_key = key;
    }

    let mut location: Location = args.location.parse()?;
    if let Some(size) = args.page_size {
        location.query.set(PAGE_SIZE_KEY, size.to_string());
    }

    let config = Config {
        table,
        initial_location: location.to_string(),
        items: args.items,
        state_dir: args.state_dir,
        steps: Step::parse_script(&args.steps)?,
        report_level: match args.verbose {
            VerbosityLevel::Verbose => ReportLevel::Full,
            _ => ReportLevel::Clipped,
        },
    };

    Runner::new(config).run()?;
    Ok(())
}
