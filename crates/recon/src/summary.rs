use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::DatasetStats;

/// A two-way player with the positions written by each pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedTwoWay {
    pub name: String,
    pub batting: String,
    pub pitching: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub season: u16,
    pub source_players: usize,
}

/// Everything one enrich run reports, ready for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub batting: DatasetStats,
    pub pitching: DatasetStats,
    pub two_way: Vec<MergedTwoWay>,
}

impl RunSummary {
    pub fn new(season: u16, source_players: usize, batting: DatasetStats, pitching: DatasetStats) -> Self {
        let two_way = merge_two_way(&batting, &pitching);
        Self {
            meta: RunMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                season,
                source_players,
            },
            batting,
            pitching,
            two_way,
        }
    }
}

/// Merge both passes' two-way observations by player name, sorted by name.
///
/// The pitching pass owns the pitching side of a name already seen in the
/// batting pass; names seen only while pitching are added as observed.
pub fn merge_two_way(batting: &DatasetStats, pitching: &DatasetStats) -> Vec<MergedTwoWay> {
    let mut merged: BTreeMap<&str, (String, String)> = BTreeMap::new();

    for obs in &batting.two_way {
        merged.insert(&obs.name, (obs.batting.clone(), obs.pitching.clone()));
    }
    for obs in &pitching.two_way {
        merged
            .entry(&obs.name)
            .and_modify(|sides| sides.1 = obs.pitching.clone())
            .or_insert_with(|| (obs.batting.clone(), obs.pitching.clone()));
    }

    merged
        .into_iter()
        .map(|(name, (batting, pitching))| MergedTwoWay {
            name: name.to_string(),
            batting,
            pitching,
        })
        .collect()
}
