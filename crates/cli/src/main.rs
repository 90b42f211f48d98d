// slotsync CLI - enrich projection CSVs with ESPN position eligibility

mod enrich;
mod exit_codes;
mod fetch;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use fetch::EspnArgs;

const DEFAULT_HITTERS: &str = "data/projections/2026/hitters.csv";
const DEFAULT_PITCHERS: &str = "data/projections/2026/pitchers.csv";

#[derive(Parser)]
#[command(name = "slotsync")]
#[command(about = "Rewrite projection position columns from ESPN slot eligibility")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the league's player pool and save it as a JSON snapshot
    #[command(after_help = "\
Examples:
  slotsync fetch --league-id 12345
  slotsync fetch --league-id 12345 --season 2026 --out players.json
  slotsync fetch --league-id 12345 --espn-s2 AEB... --swid '{1234-...}'
  ESPN_S2=AEB... ESPN_SWID='{1234-...}' slotsync fetch --league-id 12345")]
    Fetch {
        #[command(flatten)]
        espn: EspnArgs,

        /// Output JSON file path (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Rewrite the hitters/pitchers position columns in place
    #[command(after_help = "\
Examples:
  slotsync enrich --league-id 12345
  slotsync enrich --players players.json --dry-run
  slotsync enrich --players players.json --hitters h.csv --pitchers p.csv
  slotsync enrich --league-id 12345 --config slots.toml --json
  slotsync enrich --players players.json --output report.json")]
    Enrich {
        #[command(flatten)]
        espn: EspnArgs,

        /// Read players from a snapshot written by `slotsync fetch`
        #[arg(long)]
        players: Option<PathBuf>,

        /// Hitters CSV (position column: ESPN)
        #[arg(long, default_value = DEFAULT_HITTERS)]
        hitters: PathBuf,

        /// Pitchers CSV (position column: POS)
        #[arg(long, default_value = DEFAULT_PITCHERS)]
        pitchers: PathBuf,

        /// TOML config overriding the built-in tables
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report only; leave the CSV files untouched
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the run summary JSON to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  slotsync validate slots.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nrecon:   slotsync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Fetch { espn, out, quiet } => fetch::cmd_fetch(espn, out, quiet),
        Commands::Enrich {
            espn,
            players,
            hitters,
            pitchers,
            config,
            dry_run,
            json,
            output,
            quiet,
        } => enrich::cmd_enrich(enrich::EnrichOptions {
            espn,
            players,
            hitters,
            pitchers,
            config,
            dry_run,
            json,
            output,
            quiet,
        }),
        Commands::Validate { config } => enrich::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<slotsync_io::IoError> for CliError {
    fn from(err: slotsync_io::IoError) -> Self {
        let hint = match &err {
            slotsync_io::IoError::Json { .. } => {
                Some("snapshots are written by `slotsync fetch --out <file>`".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_IO, message: err.to_string(), hint }
    }
}
