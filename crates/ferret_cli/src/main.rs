//! # Commands
//!
//! - `ferret scan` - Scan a file tree with a rule set
//! - `ferret test` - Self-test every rule against its sample
//! - `ferret init` - Create a rules file from the built-in set

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod files;
mod output;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, OutputKey};

#[derive(Debug, Parser)]
#[command(
    name = "ferret",
    version,
    about = "Ferrets sensitive text out of file trees with regex rules",
    arg_required_else_help = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace/debug/info/warn/error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    #[command(visible_alias = "t")]
    Test(TestArgs),

    Init(InitArgs),
}

/// Arguments for the `ferret scan` command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Paths to scan (files or directories).
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Rules file to scan with.
    #[arg(short, long, default_value = ferret_rules::RULES_FILENAME)]
    pub rules: PathBuf,

    /// Number of parallel scan workers.
    #[arg(short, long, default_value_t = 8)]
    pub workers: usize,

    /// Files larger than this many MiB are read in chunks (0 disables
    /// chunking).
    #[arg(long, value_name = "MB", default_value_t = 5)]
    pub chunk_limit: u64,

    /// Skip files larger than this many MiB (0 scans everything).
    #[arg(long, value_name = "MB", default_value_t = 5)]
    pub limit_size: u64,

    /// Extra file extensions to exclude (e.g. `.log`), on top of the
    /// built-in binary/media list.
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_ext: Vec<String>,

    /// Path keywords to exclude (any path containing one is skipped).
    #[arg(long = "exclude-path", value_name = "KEYWORD")]
    pub exclude_path: Vec<String>,

    /// Keep only rule groups whose name contains one of these keywords.
    #[arg(short = 'G', long = "filter-groups", value_name = "KEYWORD")]
    pub filter_groups: Vec<String>,

    /// Keep only rules whose name contains one of these keywords.
    #[arg(short = 'N', long = "filter-names", value_name = "KEYWORD")]
    pub filter_names: Vec<String>,

    /// Keep only rules flagged sensitive.
    #[arg(short = 'S', long)]
    pub sensitive_only: bool,

    /// Cache scan results on disk and reuse them on the next run.
    #[arg(long)]
    pub cached: bool,

    /// Cache file path.
    #[arg(long, value_name = "PATH", default_value = "ferret.cache")]
    pub cache_file: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Split output into one file per rule group (requires --output).
    #[arg(long, requires = "output")]
    pub output_group: bool,

    /// Restrict output to these fields.
    #[arg(short = 'O', long = "output-keys", value_enum, value_name = "KEY")]
    pub output_keys: Vec<OutputKey>,

    /// Drop matches whose text contains one of these words.
    #[arg(short = 'b', long = "block-matches", value_name = "WORD")]
    pub block_matches: Vec<String>,

    /// Trim whitespace and surrounding quotes from matched text; pass
    /// `--format-results false` to emit matches exactly as found.
    #[arg(
        short = 'F',
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub format_results: bool,
}

/// Arguments for the `ferret test` command.
#[derive(Debug, Parser)]
pub struct TestArgs {
    /// Rules file to self-test.
    #[arg(short, long, default_value = ferret_rules::RULES_FILENAME)]
    pub rules: PathBuf,
}

/// Arguments for the `ferret init` command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Where to write the rules file.
    #[arg(short, long, default_value = ferret_rules::RULES_FILENAME)]
    pub rules: PathBuf,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match &cli.command {
        Command::Scan(args) => commands::scan::run(args),
        Command::Test(args) => commands::test::run(args),
        Command::Init(args) => commands::init::run(args),
    };

    if let Err(err) = result {
        ui::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
