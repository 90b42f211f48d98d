//! `slotsync fetch`: pull the ESPN player pool into a JSON snapshot.

mod common;
mod espn;

use std::path::PathBuf;

use clap::Args;
use slotsync_recon::SourceRecord;

use crate::CliError;

use espn::{EspnClient, EspnCredentials};

pub const DEFAULT_SEASON: u16 = 2026;

/// League selection and cookies, shared by `fetch` and `enrich`.
#[derive(Args, Debug, Clone)]
pub struct EspnArgs {
    /// ESPN fantasy league ID
    #[arg(long)]
    pub league_id: Option<String>,

    /// Season year
    #[arg(long, default_value_t = DEFAULT_SEASON)]
    pub season: u16,

    /// espn_s2 cookie for private leagues (default: ESPN_S2 env)
    #[arg(long)]
    pub espn_s2: Option<String>,

    /// SWID cookie for private leagues (default: ESPN_SWID env)
    #[arg(long)]
    pub swid: Option<String>,
}

impl EspnArgs {
    /// Fetch the league's player pool. Progress goes to stderr unless `quiet`.
    pub fn fetch(&self, quiet: bool) -> Result<Vec<SourceRecord>, CliError> {
        let league_id = self
            .league_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CliError::args("missing --league-id")
                    .with_hint("find it in your league URL: ...?leagueId=12345")
            })?;

        let credentials = EspnCredentials::resolve(self.espn_s2.clone(), self.swid.clone());
        let client = EspnClient::new(credentials)?;

        if !quiet {
            eprintln!("fetching ESPN players (league {}, season {})", league_id, self.season);
        }
        client.fetch_players(league_id, self.season, quiet)
    }
}

pub fn cmd_fetch(espn: EspnArgs, out: Option<PathBuf>, quiet: bool) -> Result<(), CliError> {
    let players = espn.fetch(quiet)?;
    let out_label = common::write_snapshot(&players, &out)?;

    if !quiet {
        eprintln!("wrote {} players to {}", players.len(), out_label);
    }
    Ok(())
}
