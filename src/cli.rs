use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::RunConfig;

#[derive(Parser, Debug)]
#[command(
    name = "auditlog2db",
    version,
    about = "Split an audit log into entries at its header lines and load them into SQLite"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Scan(ScanArgs),
    Status(StatusArgs),
}

impl Commands {
    pub fn log_directive(&self) -> &'static str {
        match self {
            Self::Ingest(args) => args.run_config().log_directive(),
            Self::Scan(args) => args.run_config().log_directive(),
            Self::Status(_) => "info",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Audit log to read; prompted for when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// SQLite database to write; prompted for when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Overwrite entries whose key is already stored.
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    #[arg(long, value_enum, default_value_t = PreamblePolicy::Discard)]
    pub preamble: PreamblePolicy,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

impl IngestArgs {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            debug: self.debug,
            force: self.force,
            quiet: self.quiet,
            preamble: self.preamble,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, value_enum, default_value_t = PreamblePolicy::Discard)]
    pub preamble: PreamblePolicy,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

impl ScanArgs {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            debug: self.debug,
            preamble: self.preamble,
            ..RunConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub db: PathBuf,

    #[arg(long, default_value_t = 20)]
    pub event_limit: usize,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PreamblePolicy {
    #[default]
    Discard,
    Keep,
}

impl PreamblePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discard => "discard",
            Self::Keep => "keep",
        }
    }
}
