use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

use crate::config::ColumnConfig;
use crate::slots::{SlotId, SlotTable};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One player from the eligibility source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub eligible_slots: Vec<SlotId>,
}

/// A target dataset: header row plus data rows, column order preserved.
///
/// Rows may be ragged; a missing trailing cell reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header equal to `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

pub(crate) fn set_cell(row: &mut Vec<String>, idx: usize, value: String) {
    if row.len() <= idx {
        row.resize(idx + 1, String::new());
    }
    row[idx] = value;
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Batting,
    Pitching,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Self::Batting => Self::Pitching,
            Self::Pitching => Self::Batting,
        }
    }

    pub fn filter(self, slots: &SlotTable) -> &BTreeSet<SlotId> {
        slots.filter(self)
    }

    /// Header of the position column this role rewrites.
    pub fn position_column(self, columns: &ColumnConfig) -> &str {
        match self {
            Self::Batting => &columns.batting_position,
            Self::Pitching => &columns.pitching_position,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batting => write!(f, "batting"),
            Self::Pitching => write!(f, "pitching"),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// A rewritten position field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionChange {
    pub name: String,
    pub old: String,
    pub new: String,
}

impl std::fmt::Display for PositionChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.old, self.new)
    }
}

/// A matched player with positions under both roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwoWayObservation {
    pub name: String,
    pub batting: String,
    pub pitching: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub exact: usize,
    pub team: usize,
    pub fuzzy: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub role: Role,
    pub total_rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub unmatched_players: Vec<String>,
    pub changes: Vec<PositionChange>,
    pub two_way: Vec<TwoWayObservation>,
    pub by_method: MethodCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl DatasetStats {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            total_rows: 0,
            matched: 0,
            unmatched: 0,
            unmatched_players: Vec::new(),
            changes: Vec::new(),
            two_way: Vec::new(),
            by_method: MethodCounts::default(),
            skipped: None,
        }
    }

    pub fn skipped(role: Role, reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Self::new(role)
        }
    }
}
