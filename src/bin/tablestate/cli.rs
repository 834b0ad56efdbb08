use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about = "Replays a cursor-paginated table session", long_about = None)]
pub struct Args {
    #[arg(
        long,
        default_value = "next,next,prev,reload,back,forward,filter status=active,next,clear",
        value_name = "SCRIPT",
        help = "Comma-separated steps: next, prev, reload, back, forward, clear, filter KEY=VALUE, page-size N"
    )]
    pub steps: String,

    #[arg(long, default_value_t = 42, value_name = "N", help = "Number of fixture records")]
    pub items: u64,

    #[arg(long, value_name = "N", help = "Initial page size")]
    pub page_size: Option<u32>,

    #[arg(long, default_value = "/records", value_name = "PATH", help = "Initial location")]
    pub location: String,

    #[arg(long, value_name = "KEY", help = "Cursor history storage key")]
    pub storage_key: Option<String>,

    #[arg(long, value_name = "DIR", help = "Persist cursor histories in this directory")]
    pub state_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Table configuration (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        short,
        default_value_t = VerbosityLevel::Quiet,
        value_name = "LEVEL",
        help = "Set the verbosity level"
    )]
    pub verbose: VerbosityLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
}

impl VerbosityLevel {
    pub fn filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "warn",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

impl std::fmt::Display for VerbosityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VerbosityLevel::Quiet => write!(f, "quiet"),
            VerbosityLevel::Normal => write!(f, "normal"),
            VerbosityLevel::Verbose => write!(f, "verbose"),
        }
    }
}
