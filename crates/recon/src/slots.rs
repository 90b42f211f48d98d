//! Eligibility slot table and position extraction.
//!
//! A source record lists every roster slot a player may fill, concrete
//! fielding positions and umbrella slots alike (`OF`, `MI`, `UTIL`, `BE`,
//! `IL`, …). Extraction keeps the concrete slots relevant to one role and
//! renders them in slot-id order, e.g. `{10, 4, 12}` → `"SS/RF"`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer};

use crate::error::ReconError;
use crate::model::Role;

/// Slot ids are small integers from the source's fixed enumeration.
pub type SlotId = u16;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlotTable {
    /// Slot id → display abbreviation. TOML keys are the ids as strings.
    #[serde(deserialize_with = "slot_keyed_map")]
    pub display: BTreeMap<SlotId, String>,
    /// Slots naming one specific position; everything else is a meta slot.
    pub concrete: BTreeSet<SlotId>,
    /// Role filter for hitters.
    pub batting: BTreeSet<SlotId>,
    /// Role filter for pitchers.
    pub pitching: BTreeSet<SlotId>,
    /// Umbrella "any outfield" slot.
    pub generic_outfield: SlotId,
    /// The concrete outfield slots covered by `generic_outfield`.
    pub specific_outfield: BTreeSet<SlotId>,
    /// Token written when only the umbrella outfield slot is present.
    pub generic_outfield_token: String,
}

impl Default for SlotTable {
    fn default() -> Self {
        let display = [
            (0, "C"),
            (1, "1B"),
            (2, "2B"),
            (3, "3B"),
            (4, "SS"),
            (8, "LF"),
            (9, "CF"),
            (10, "RF"),
            (11, "DH"),
            (14, "SP"),
            (15, "RP"),
        ]
        .into_iter()
        .map(|(id, abbr)| (id, abbr.to_string()))
        .collect();

        Self {
            display,
            concrete: BTreeSet::from([0, 1, 2, 3, 4, 8, 9, 10, 11, 14, 15]),
            batting: BTreeSet::from([0, 1, 2, 3, 4, 8, 9, 10, 11]),
            pitching: BTreeSet::from([14, 15]),
            generic_outfield: 5,
            specific_outfield: BTreeSet::from([8, 9, 10]),
            generic_outfield_token: "OF".into(),
        }
    }
}

fn slot_keyed_map<'de, D>(deserializer: D) -> Result<BTreeMap<SlotId, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, abbr)| {
            key.trim()
                .parse::<SlotId>()
                .map(|id| (id, abbr))
                .map_err(|_| serde::de::Error::custom(format!("slot id '{key}' is not an integer")))
        })
        .collect()
}

impl SlotTable {
    pub fn validate(&self) -> Result<(), ReconError> {
        for id in &self.concrete {
            match self.display.get(id) {
                Some(abbr) if !abbr.trim().is_empty() => {}
                _ => {
                    return Err(ReconError::ConfigValidation(format!(
                        "slots: concrete slot {id} has no display abbreviation"
                    )))
                }
            }
        }

        for (name, filter) in [("batting", &self.batting), ("pitching", &self.pitching)] {
            if let Some(id) = filter.iter().find(|id| !self.concrete.contains(id)) {
                return Err(ReconError::ConfigValidation(format!(
                    "slots.{name}: slot {id} is not a concrete slot"
                )));
            }
        }

        if self.generic_outfield_token.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "slots.generic_outfield_token must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn filter(&self, role: Role) -> &BTreeSet<SlotId> {
        match role {
            Role::Batting => &self.batting,
            Role::Pitching => &self.pitching,
        }
    }

    /// Concrete slots of `codes` that pass `filter`, ordered by slot id and
    /// joined with `/`. Empty when nothing survives.
    pub fn extract(&self, codes: &[SlotId], filter: &BTreeSet<SlotId>) -> String {
        let kept: BTreeSet<SlotId> = codes
            .iter()
            .copied()
            .filter(|id| filter.contains(id) && self.concrete.contains(id))
            .collect();

        kept.iter()
            .filter_map(|id| self.display.get(id).map(String::as_str))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// True when `codes` has the umbrella outfield slot but none of the
    /// specific outfield slots.
    pub fn has_only_generic_outfield(&self, codes: &[SlotId]) -> bool {
        codes.contains(&self.generic_outfield)
            && !codes.iter().any(|id| self.specific_outfield.contains(id))
    }

    /// Position string for `role`, with the generic-outfield fallback layered
    /// on top of [`extract`](Self::extract) for hitters.
    pub fn positions_for(&self, codes: &[SlotId], role: Role) -> String {
        let positions = self.extract(codes, self.filter(role));
        if positions.is_empty() && role == Role::Batting && self.has_only_generic_outfield(codes) {
            return self.generic_outfield_token.clone();
        }
        positions
    }
}
