use tracing::debug;

use crate::config::ReconConfig;
use crate::index::EligibilityIndex;
use crate::model::SourceRecord;
use crate::normalize::{NameNormalizer, TeamNormalizer};

/// How a target row was resolved to a source record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchMethod {
    /// The normalized name had exactly one candidate.
    Exact,
    /// Several candidates shared the name; team picked one.
    Team,
    /// No exact key; an approximate key plus team agreement.
    Fuzzy { ratio: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerMatch<'a> {
    pub record: &'a SourceRecord,
    pub method: MatchMethod,
}

/// One record or none. Ambiguity without a team tie-breaker is "none".
pub type MatchResult<'a> = Option<PlayerMatch<'a>>;

/// Resolves `(name, team)` pairs against an [`EligibilityIndex`].
#[derive(Debug, Clone)]
pub struct Matcher {
    names: NameNormalizer,
    teams: TeamNormalizer,
    threshold: f64,
}

impl Matcher {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            names: NameNormalizer::from_config(config),
            teams: TeamNormalizer::from_config(config),
            threshold: config.matching.fuzzy_threshold,
        }
    }

    /// The normalizer used for index keys; build the index with this one.
    pub fn names(&self) -> &NameNormalizer {
        &self.names
    }

    pub fn match_player<'i>(
        &self,
        name: &str,
        team: &str,
        index: &'i EligibilityIndex,
    ) -> MatchResult<'i> {
        let key = self.names.normalize(name);
        let team = self.teams.normalize(team);

        let candidates = index.candidates(&key);
        match candidates {
            [only] => {
                return Some(PlayerMatch {
                    record: only,
                    method: MatchMethod::Exact,
                })
            }
            [] => {}
            many => {
                let picked = many.iter().find(|c| c.team == team);
                if picked.is_none() {
                    debug!(name, team = %team, candidates = many.len(), "ambiguous name, no team match");
                }
                return picked.map(|record| PlayerMatch {
                    record,
                    method: MatchMethod::Team,
                });
            }
        }

        for (fuzzy_key, ratio) in rank_fuzzy(&key, index, self.threshold) {
            if let Some(record) = index.candidates(fuzzy_key).iter().find(|c| c.team == team) {
                debug!(name, matched = %record.name, ratio, "approximate match");
                return Some(PlayerMatch {
                    record,
                    method: MatchMethod::Fuzzy { ratio },
                });
            }
        }

        None
    }
}

/// Similarity in `[0, 1]`: one minus edit distance over the longer length.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Index keys scoring at least `threshold` against `target`, best first.
/// Equal ratios keep index insertion order.
pub fn rank_fuzzy<'i>(
    target: &str,
    index: &'i EligibilityIndex,
    threshold: f64,
) -> Vec<(&'i str, f64)> {
    let target_len = target.chars().count();

    let mut ranked: Vec<(&str, f64)> = index
        .entries()
        .filter(|(key, _)| length_bound(target_len, key.chars().count()) >= threshold)
        .map(|(key, _)| (key, similarity(target, key)))
        .filter(|(_, ratio)| *ratio >= threshold)
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Best ratio two strings of these lengths could reach; the edit distance is
/// at least the length difference.
fn length_bound(a: usize, b: usize) -> f64 {
    let longest = a.max(b);
    if longest == 0 {
        return 1.0;
    }
    1.0 - a.abs_diff(b) as f64 / longest as f64
}
