use tracing::{debug, warn};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::index::EligibilityIndex;
use crate::matcher::{MatchMethod, Matcher};
use crate::model::{cell, set_cell, DatasetStats, PositionChange, Role, Table, TwoWayObservation};

/// Output of one dataset pass.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Rewritten table. Same headers and row count as the input, or no rows
    /// at all when the pass was skipped.
    pub table: Table,
    pub stats: DatasetStats,
}

/// Rewrite `role`'s position column of `table` from the matched source
/// records in `index`.
///
/// Never fails: unmatched and ambiguous rows pass through untouched, and a
/// table missing a required column comes back empty with
/// [`DatasetStats::skipped`] set.
pub fn reconcile(
    mut table: Table,
    index: &EligibilityIndex,
    matcher: &Matcher,
    role: Role,
    config: &ReconConfig,
) -> Reconciled {
    let columns = &config.columns;
    let position_column = role.position_column(columns);

    let (name_idx, pos_idx) = match (table.column(&columns.name), table.column(position_column)) {
        (Some(n), Some(p)) => (n, p),
        (None, _) => return skip(table, role, &columns.name),
        (_, None) => return skip(table, role, position_column),
    };
    let team_idx = table.column(&columns.team);
    if team_idx.is_none() {
        warn!(%role, column = %columns.team, "team column missing; team disambiguation disabled");
    }

    let slots = &config.slots;
    let opposite = role.opposite().filter(slots);
    let mut stats = DatasetStats::new(role);
    stats.total_rows = table.rows.len();

    for row in &mut table.rows {
        let name = cell(row, name_idx).trim().to_string();
        let team = team_idx.map(|i| cell(row, i).trim()).unwrap_or("").to_string();
        let old = cell(row, pos_idx).trim().to_string();

        let Some(hit) = matcher.match_player(&name, &team, index) else {
            debug!(%role, name = %name, team = %team, "unmatched");
            stats.unmatched += 1;
            stats.unmatched_players.push(format!("{name} ({team})"));
            continue;
        };

        stats.matched += 1;
        match hit.method {
            MatchMethod::Exact => stats.by_method.exact += 1,
            MatchMethod::Team => stats.by_method.team += 1,
            MatchMethod::Fuzzy { .. } => stats.by_method.fuzzy += 1,
        }

        let codes = &hit.record.eligible_slots;
        let new = slots.positions_for(codes, role);
        if !new.is_empty() && new != old {
            set_cell(row, pos_idx, new.clone());
            stats.changes.push(PositionChange {
                name: name.clone(),
                old: old.clone(),
                new: new.clone(),
            });
        }

        let other = slots.extract(codes, opposite);
        if !other.is_empty() {
            let primary = if new.is_empty() { old } else { new };
            let (batting, pitching) = match role {
                Role::Batting => (primary, other),
                Role::Pitching => (other, primary),
            };
            stats.two_way.push(TwoWayObservation {
                name,
                batting,
                pitching,
            });
        }
    }

    debug!(
        %role,
        matched = stats.matched,
        unmatched = stats.unmatched,
        changes = stats.changes.len(),
        "dataset reconciled"
    );

    Reconciled { table, stats }
}

fn skip(table: Table, role: Role, column: &str) -> Reconciled {
    let err = ReconError::MissingColumn {
        dataset: role.to_string(),
        column: column.to_string(),
    };
    warn!("{err}; dataset skipped");
    let reason = format!("missing column '{column}'");
    Reconciled {
        table: Table::new(table.headers, Vec::new()),
        stats: DatasetStats::skipped(role, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceRecord;

    fn rec(id: i64, name: &str, team: &str, slots: &[u16]) -> SourceRecord {
        SourceRecord {
            id,
            name: name.into(),
            team: team.into(),
            eligible_slots: slots.to_vec(),
        }
    }

    fn source() -> Vec<SourceRecord> {
        vec![
            rec(1, "Juan Soto", "NYM", &[5, 10, 12, 16, 17]),
            rec(2, "Shohei Ohtani", "LAD", &[1, 5, 8, 11, 12, 14, 16, 17]),
            rec(3, "Will Smith", "LAD", &[0, 12, 16, 17]),
            rec(4, "Will Smith", "ATL", &[13, 15, 16, 17]),
            rec(5, "Generic Outfielder", "SEA", &[5, 12, 16, 17]),
            rec(6, "Util Only", "BOS", &[12, 16, 17]),
            rec(7, "Gerrit Cole", "NYY", &[13, 14, 16, 17]),
        ]
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn hitters() -> Table {
        Table::new(
            row(&["Name", "Team", "ESPN", "HR"]),
            vec![
                row(&["Juan Soto", "NYM", "OF", "35"]),
                row(&["Shohei Ohtani", "LAD", "DH", "44"]),
                row(&["Will Smith", "LAD", "C", "20"]),
                row(&["Generic Outfielder", "SEA", "", "3"]),
                row(&["Util Only", "BOS", "1B", "9"]),
                row(&["Nobody Known", "MIA", "SS", "1"]),
            ],
        )
    }

    fn run(table: Table, role: Role) -> Reconciled {
        let config = ReconConfig::default();
        let matcher = Matcher::new(&config);
        let index = EligibilityIndex::build(source(), matcher.names());
        reconcile(table, &index, &matcher, role, &config)
    }

    #[test]
    fn batting_pass_rewrites_and_counts() {
        let out = run(hitters(), Role::Batting);
        let rows = &out.table.rows;
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0][2], "RF");
        assert_eq!(rows[1][2], "1B/LF/DH");
        assert_eq!(rows[2][2], "C");
        assert_eq!(rows[3][2], "OF");
        // Empty extraction keeps the old value.
        assert_eq!(rows[4][2], "1B");
        // Unmatched row untouched, other columns preserved.
        assert_eq!(rows[5], row(&["Nobody Known", "MIA", "SS", "1"]));
        assert_eq!(rows[0][3], "35");

        let stats = &out.stats;
        assert_eq!(stats.total_rows, 6);
        assert_eq!(stats.matched, 5);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.unmatched_players, vec!["Nobody Known (MIA)"]);
        let changes: Vec<String> = stats.changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            changes,
            vec![
                "Juan Soto: OF -> RF",
                "Shohei Ohtani: DH -> 1B/LF/DH",
                "Generic Outfielder:  -> OF",
            ]
        );
        assert_eq!(stats.by_method.exact, 4);
        assert_eq!(stats.by_method.team, 1);
        assert!(stats.skipped.is_none());
    }

    #[test]
    fn batting_pass_records_two_way() {
        let out = run(hitters(), Role::Batting);
        assert_eq!(
            out.stats.two_way,
            vec![TwoWayObservation {
                name: "Shohei Ohtani".into(),
                batting: "1B/LF/DH".into(),
                pitching: "SP".into(),
            }]
        );
    }

    #[test]
    fn pitching_pass() {
        let table = Table::new(
            row(&["Name", "Team", "POS", "IP"]),
            vec![
                row(&["Gerrit Cole", "NYY", "SP", "200"]),
                row(&["Will Smith", "ATL", "SP", "60"]),
                row(&["Shohei Ohtani", "LAD", "", "130"]),
                row(&["Will Smith", "SEA", "RP", "50"]),
            ],
        );
        let out = run(table, Role::Pitching);
        let rows = &out.table.rows;
        assert_eq!(rows[0][2], "SP");
        assert_eq!(rows[1][2], "RP");
        assert_eq!(rows[2][2], "SP");
        assert_eq!(rows[3][2], "RP");

        let stats = &out.stats;
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.unmatched_players, vec!["Will Smith (SEA)"]);
        assert_eq!(stats.changes.len(), 2);
        assert_eq!(
            stats.two_way,
            vec![TwoWayObservation {
                name: "Shohei Ohtani".into(),
                batting: "1B/LF/DH".into(),
                pitching: "SP".into(),
            }]
        );
    }

    #[test]
    fn two_way_primary_side_falls_back_to_old_value() {
        let mut records = source();
        records.push(rec(8, "Odd Two Way", "CHC", &[0, 13, 16]));
        let config = ReconConfig::default();
        let matcher = Matcher::new(&config);
        let index = EligibilityIndex::build(records, matcher.names());
        let table = Table::new(
            row(&["Name", "Team", "POS"]),
            vec![row(&["Odd Two Way", "CHC", "RP"])],
        );
        let out = reconcile(table, &index, &matcher, Role::Pitching, &config);
        assert_eq!(out.table.rows[0][2], "RP");
        assert!(out.stats.changes.is_empty());
        assert_eq!(out.stats.two_way[0].pitching, "RP");
        assert_eq!(out.stats.two_way[0].batting, "C");
    }

    #[test]
    fn unchanged_value_logs_no_change() {
        let table = Table::new(
            row(&["Name", "Team", "ESPN"]),
            vec![row(&["Will Smith", "LAD", " C "])],
        );
        let out = run(table, Role::Batting);
        assert!(out.stats.changes.is_empty());
        assert_eq!(out.stats.matched, 1);
    }

    #[test]
    fn missing_position_column_skips_dataset() {
        let table = Table::new(row(&["Name", "Team", "POS"]), vec![row(&["Juan Soto", "NYM", "OF"])]);
        let out = run(table, Role::Batting);
        assert!(out.table.is_empty());
        assert_eq!(out.table.headers, row(&["Name", "Team", "POS"]));
        assert_eq!(out.stats.skipped.as_deref(), Some("missing column 'ESPN'"));
        assert_eq!(out.stats.matched, 0);
    }

    #[test]
    fn missing_name_column_skips_dataset() {
        let table = Table::new(row(&["Player", "Team", "ESPN"]), vec![row(&["Juan Soto", "NYM", "OF"])]);
        let out = run(table, Role::Batting);
        assert!(out.table.is_empty());
        assert_eq!(out.stats.skipped.as_deref(), Some("missing column 'Name'"));
    }

    #[test]
    fn missing_team_column_is_tolerated() {
        let table = Table::new(
            row(&["Name", "ESPN"]),
            vec![row(&["Juan Soto", "OF"]), row(&["Will Smith", "C"])],
        );
        let out = run(table, Role::Batting);
        assert_eq!(out.table.rows[0][1], "RF");
        assert_eq!(out.stats.matched, 1);
        assert_eq!(out.stats.unmatched_players, vec!["Will Smith ()"]);
    }

    #[test]
    fn ragged_row_is_padded_on_write() {
        let table = Table::new(row(&["Name", "Team", "ESPN"]), vec![row(&["Juan Soto", "NYM"])]);
        let out = run(table, Role::Batting);
        assert_eq!(out.table.rows[0], row(&["Juan Soto", "NYM", "RF"]));
    }
}
