use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ReconError;
use crate::normalize;
use crate::slots::SlotTable;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every lookup table the engine consults. Built once at startup and passed
/// by reference into the normalizers, the extractor and the matcher.
///
/// All sections are optional in TOML; an omitted section keeps the built-in
/// ESPN tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub matching: MatchingConfig,
    pub teams: TeamConfig,
    pub slots: SlotTable,
    pub columns: ColumnConfig,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Minimum similarity ratio for an approximate name match.
    pub fuzzy_threshold: f64,
    /// Generational suffix tokens dropped from the end of a name.
    pub suffixes: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            suffixes: ["jr", "sr", "ii", "iii", "iv", "v"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Alternate team abbreviations mapped onto the source's canonical codes.
/// A user-supplied `[teams.aliases]` table replaces the default one.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeamConfig {
    pub aliases: BTreeMap<String, String>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        let aliases = [
            ("WAS", "WSH"),
            ("TBR", "TB"),
            ("CHW", "CWS"),
            ("ANA", "LAA"),
            ("KCR", "KC"),
            ("SDP", "SD"),
            ("SFG", "SF"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        Self { aliases }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub name: String,
    pub team: String,
    /// Position column rewritten in the hitters table.
    pub batting_position: String,
    /// Position column rewritten in the pitchers table.
    pub pitching_position: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            team: "Team".into(),
            batting_position: "ESPN".into(),
            pitching_position: "POS".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.canonicalize();
        config.validate()?;
        Ok(config)
    }

    /// Fold user-supplied tokens into the form the normalizers compare against.
    /// Suffixes get the same folding as names, so `"Jr."` becomes `"jr"`.
    fn canonicalize(&mut self) {
        for suffix in &mut self.matching.suffixes {
            *suffix = normalize::fold(suffix);
        }
        self.teams.aliases = std::mem::take(&mut self.teams.aliases)
            .into_iter()
            .map(|(from, to)| (from.trim().to_uppercase(), to.trim().to_uppercase()))
            .collect();
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let threshold = self.matching.fuzzy_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "matching.fuzzy_threshold must be in (0, 1], got {threshold}"
            )));
        }

        for suffix in &self.matching.suffixes {
            if suffix.is_empty() || suffix.chars().any(char::is_whitespace) {
                return Err(ReconError::ConfigValidation(format!(
                    "matching.suffixes: '{suffix}' must be a single non-empty token"
                )));
            }
        }

        for (from, to) in &self.teams.aliases {
            if from.is_empty() || to.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "teams.aliases: codes must be non-empty".into(),
                ));
            }
        }

        self.slots.validate()?;

        let columns = [
            ("name", &self.columns.name),
            ("team", &self.columns.team),
            ("batting_position", &self.columns.batting_position),
            ("pitching_position", &self.columns.pitching_position),
        ];
        for (field, value) in columns {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.matching.fuzzy_threshold, 0.85);
        assert_eq!(config.matching.suffixes.len(), 6);
        assert_eq!(config.teams.aliases["WAS"], "WSH");
        assert_eq!(config.columns.batting_position, "ESPN");
        assert_eq!(config.columns.pitching_position, "POS");
        assert_eq!(config.slots.display[&4], "SS");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ReconConfig::from_toml(
            r#"
[matching]
fuzzy_threshold = 0.9

[columns]
batting_position = "Pos"
"#,
        )
        .unwrap();
        assert_eq!(config.matching.fuzzy_threshold, 0.9);
        assert_eq!(config.matching.suffixes.len(), 6);
        assert_eq!(config.columns.batting_position, "Pos");
        assert_eq!(config.columns.name, "Name");
    }

    #[test]
    fn aliases_and_suffixes_are_case_folded() {
        let config = ReconConfig::from_toml(
            r#"
[matching]
suffixes = ["JR", " Sr "]

[teams.aliases]
was = "wsh"
"#,
        )
        .unwrap();
        assert_eq!(config.matching.suffixes, vec!["jr", "sr"]);
        assert_eq!(config.teams.aliases["WAS"], "WSH");
        // User table replaces the default one.
        assert!(!config.teams.aliases.contains_key("TBR"));
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let err = ReconConfig::from_toml("[matching]\nfuzzy_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        let err = ReconConfig::from_toml("[matching]\nfuzzy_threshold = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("fuzzy_threshold"));
    }

    #[test]
    fn punctuated_suffix_folded_and_stripped() {
        let config = ReconConfig::from_toml("[matching]\nsuffixes = [\"jr.\", \"Sr.\"]\n").unwrap();
        assert_eq!(config.matching.suffixes, vec!["jr", "sr"]);

        let names = crate::normalize::NameNormalizer::from_config(&config);
        assert_eq!(names.normalize("Bobby Witt Jr."), "bobby witt");
        assert_eq!(names.normalize("Ken Griffey Sr"), "ken griffey");
    }

    #[test]
    fn suffix_folding_to_nothing_rejected() {
        let err = ReconConfig::from_toml("[matching]\nsuffixes = [\".\"]\n").unwrap_err();
        assert!(err.to_string().contains("single non-empty token"));
        let err = ReconConfig::from_toml("[matching]\nsuffixes = [\"jr-sr\"]\n").unwrap_err();
        assert!(err.to_string().contains("single non-empty token"));
    }

    #[test]
    fn multi_token_suffix_rejected() {
        let err = ReconConfig::from_toml("[matching]\nsuffixes = [\"jr sr\"]\n").unwrap_err();
        assert!(err.to_string().contains("single non-empty token"));
    }

    #[test]
    fn empty_column_rejected() {
        let err = ReconConfig::from_toml("[columns]\nname = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("columns.name"));
    }

    #[test]
    fn unknown_section_is_a_parse_error() {
        let err = ReconConfig::from_toml("[bogus]\nx = 1\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
