//! `slotsync fetch`: pull the ESPN fantasy baseball player pool.

use std::thread;
use std::time::Duration;

use slotsync_recon::SourceRecord;
use tracing::{debug, info, warn};

use crate::exit_codes;
use crate::CliError;

use super::common::{self, FetchClient};

// ── Constants ───────────────────────────────────────────────────────

const ESPN_API_BASE: &str = "https://lm-api-reads.fantasy.espn.com";
const PAGE_SIZE: usize = 250;
const PAGE_DELAY: Duration = Duration::from_secs(1);

pub(crate) const ENV_ESPN_S2: &str = "ESPN_S2";
pub(crate) const ENV_SWID: &str = "ESPN_SWID";

// ── Team mapping ────────────────────────────────────────────────────

/// ESPN `proTeamId` → team abbreviation. Unknown ids map to `"???"`.
fn team_abbrev(pro_team_id: i64) -> &'static str {
    match pro_team_id {
        0 => "FA",
        1 => "BAL",
        2 => "BOS",
        3 => "LAA",
        4 => "CWS",
        5 => "CLE",
        6 => "DET",
        7 => "KC",
        8 => "MIL",
        9 => "MIN",
        10 => "NYY",
        11 => "OAK",
        12 => "SEA",
        13 => "TEX",
        14 => "TOR",
        15 => "ATL",
        16 => "CHC",
        17 => "CIN",
        18 => "HOU",
        19 => "LAD",
        20 => "WSH",
        21 => "NYM",
        22 => "PHI",
        23 => "PIT",
        24 => "STL",
        25 => "SD",
        26 => "SF",
        27 => "COL",
        28 => "MIA",
        29 => "ARI",
        30 => "TB",
        _ => "???",
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// League cookies. Public leagues need neither; private leagues need both.
#[derive(Debug, Clone, Default)]
pub struct EspnCredentials {
    espn_s2: Option<String>,
    swid: Option<String>,
}

impl EspnCredentials {
    /// Flag > env for each cookie. ESPN ignores a SWID sent without
    /// `espn_s2`, so a lone SWID is dropped and the league is read as public.
    pub fn resolve(espn_s2: Option<String>, swid: Option<String>) -> Self {
        let espn_s2 = common::resolve_credential(espn_s2, ENV_ESPN_S2);
        let mut swid = common::resolve_credential(swid, ENV_SWID);

        if espn_s2.is_none() && swid.take().is_some() {
            warn!("SWID given without espn_s2; ignoring it and fetching as a public league");
        }

        Self { espn_s2, swid }
    }

    fn cookie(&self) -> Option<String> {
        let s2 = self.espn_s2.as_ref()?;
        Some(match &self.swid {
            Some(swid) => format!("espn_s2={s2}; SWID={swid}"),
            None => format!("espn_s2={s2}"),
        })
    }
}

fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 | 403 => Some("check your espn_s2 and SWID cookies"),
        404 => Some("check the league id and season"),
        _ => None,
    }
}

// ── ESPN client ─────────────────────────────────────────────────────

pub struct EspnClient {
    client: FetchClient,
    credentials: EspnCredentials,
    base_url: String,
    page_delay: Duration,
}

impl EspnClient {
    pub fn new(credentials: EspnCredentials) -> Result<Self, CliError> {
        Self::with_base_url(credentials, ESPN_API_BASE.to_string())
    }

    pub fn with_base_url(credentials: EspnCredentials, base_url: String) -> Result<Self, CliError> {
        Ok(Self {
            client: FetchClient::new("ESPN", status_hint)?,
            credentials,
            base_url,
            page_delay: PAGE_DELAY,
        })
    }

    #[cfg(test)]
    fn without_delays(mut self) -> Self {
        self.page_delay = Duration::ZERO;
        self.client = self.client.with_initial_backoff(Duration::ZERO);
        self
    }

    /// Fetch every player in the league's pool, most-owned first.
    pub fn fetch_players(
        &self,
        league_id: &str,
        season: u16,
        quiet: bool,
    ) -> Result<Vec<SourceRecord>, CliError> {
        let url = format!(
            "{}/apis/v3/games/flb/seasons/{}/segments/0/leagues/{}",
            self.base_url, season, league_id,
        );
        let cookie = self.credentials.cookie();
        let show_progress = !quiet && atty::is(atty::Stream::Stderr);

        let mut players = Vec::new();
        let mut offset = 0usize;
        let mut page = 0u32;

        loop {
            page += 1;
            let filter = filter_header(offset);

            let body = self.client.request_with_retry(|http| {
                let mut req = http
                    .get(&url)
                    .query(&[("view", "kona_player_info")])
                    .header("X-Fantasy-Filter", &filter)
                    .header("Accept", "application/json");
                if let Some(ref cookie) = cookie {
                    req = req.header("Cookie", cookie);
                }
                req
            })?;

            let batch = body["players"].as_array().ok_or_else(|| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: "ESPN response missing 'players' array".into(),
                hint: None,
            })?;

            if show_progress {
                eprintln!("  page {}: {} players (offset={})", page, batch.len(), offset);
            }
            debug!(page, offset, count = batch.len(), "fetched player page");

            players.extend(batch.iter().map(parse_player));

            if batch.len() < PAGE_SIZE {
                break;
            }

            offset += PAGE_SIZE;
            thread::sleep(self.page_delay);
        }

        info!(players = players.len(), pages = page, "player pool fetched");
        Ok(players)
    }
}

fn filter_header(offset: usize) -> String {
    serde_json::json!({
        "players": {
            "limit": PAGE_SIZE,
            "offset": offset,
            "sortPercOwned": { "sortAsc": false, "sortPriority": 1 }
        }
    })
    .to_string()
}

// ── Parse a single player entry ─────────────────────────────────────

/// Read one entry of the `players` array. The player object sits under
/// `playerPoolEntry.player` or directly under `player`; absent fields fall
/// back to empty/zero values.
fn parse_player(item: &serde_json::Value) -> SourceRecord {
    let entry = item.get("playerPoolEntry").unwrap_or(item);
    let player = &entry["player"];

    let eligible_slots = player["eligibleSlots"]
        .as_array()
        .map(|slots| {
            slots
                .iter()
                .filter_map(|s| s.as_u64())
                .filter_map(|s| u16::try_from(s).ok())
                .collect()
        })
        .unwrap_or_default();

    SourceRecord {
        id: player["id"].as_i64().unwrap_or(0),
        name: player["fullName"].as_str().unwrap_or("").to_string(),
        team: team_abbrev(player["proTeamId"].as_i64().unwrap_or(0)).to_string(),
        eligible_slots,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
