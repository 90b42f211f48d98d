//! `slotsync enrich` and `slotsync validate`.

use std::path::{Path, PathBuf};

use slotsync_recon::summary::RunSummary;
use slotsync_recon::{reconcile, DatasetStats, EligibilityIndex, Matcher, ReconConfig, Role, SourceRecord};
use tracing::info;

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::fetch::EspnArgs;
use crate::report;
use crate::CliError;

pub struct EnrichOptions {
    pub espn: EspnArgs,
    pub players: Option<PathBuf>,
    pub hitters: PathBuf,
    pub pitchers: PathBuf,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
}

/// Built-in tables, or the TOML file at `path` layered over them.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&config_str)
        .map_err(|e| config_err(format!("{}: {e}", path.display())))
}

fn load_source(opts: &EnrichOptions) -> Result<Vec<SourceRecord>, CliError> {
    match (&opts.players, &opts.espn.league_id) {
        (Some(_), Some(_)) => Err(CliError::args("--players and --league-id are mutually exclusive")),
        (Some(snapshot), None) => {
            let players = slotsync_io::json::read_snapshot(snapshot)?;
            if !opts.quiet {
                eprintln!("loaded {} players from {}", players.len(), snapshot.display());
            }
            Ok(players)
        }
        (None, Some(_)) => opts.espn.fetch(opts.quiet),
        (None, None) => Err(CliError::args("no player source")
            .with_hint("pass --league-id to fetch from ESPN, or --players with a saved snapshot")),
    }
}

pub fn cmd_enrich(opts: EnrichOptions) -> Result<(), CliError> {
    let config = load_config(opts.config.as_deref())?;
    let players = load_source(&opts)?;
    let source_players = players.len();

    let matcher = Matcher::new(&config);
    let index = EligibilityIndex::build(players, matcher.names());
    info!(keys = index.len(), records = index.record_count(), "eligibility index built");

    let batting = enrich_file(&opts.hitters, Role::Batting, &index, &matcher, &config, &opts)?;
    let pitching = enrich_file(&opts.pitchers, Role::Pitching, &index, &matcher, &config, &opts)?;
    let summary = RunSummary::new(opts.espn.season, source_players, batting, pitching);

    if opts.json || opts.output.is_some() {
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = opts.output {
            std::fs::write(path, format!("{json_str}\n"))
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            if !opts.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        if opts.json {
            println!("{json_str}");
        }
    }

    let mut rendered = String::new();
    report::render(&mut rendered, &summary, opts.dry_run)
        .map_err(|e| CliError::io(format!("report formatting error: {e}")))?;
    if opts.json {
        if !opts.quiet {
            eprint!("{rendered}");
        }
    } else {
        print!("{rendered}");
    }

    Ok(())
}

/// Reconcile one projection file and rewrite it in place unless the pass
/// produced no rows or this is a dry run.
fn enrich_file(
    path: &Path,
    role: Role,
    index: &EligibilityIndex,
    matcher: &Matcher,
    config: &ReconConfig,
    opts: &EnrichOptions,
) -> Result<DatasetStats, CliError> {
    if !opts.quiet {
        eprintln!("processing {role}: {}", path.display());
    }
    let file = slotsync_io::csv::read_table(path)?;
    let reconciled = reconcile(file.table, index, matcher, role, config);

    if !opts.dry_run && !reconciled.table.is_empty() {
        slotsync_io::csv::write_table(path, &reconciled.table, file.encoding)?;
    }
    Ok(reconciled.stats)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    println!(
        "{}: ok (fuzzy_threshold {}, {} suffixes, {} team aliases, {} concrete slots)",
        config_path.display(),
        config.matching.fuzzy_threshold,
        config.matching.suffixes.len(),
        config.teams.aliases.len(),
        config.slots.concrete.len(),
    );
    Ok(())
}
