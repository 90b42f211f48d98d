//! Name and team canonicalization.

use std::collections::{HashMap, HashSet};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::ReconConfig;

/// Turns a free-text player name into an index key.
///
/// Lowercases, strips accents, deletes periods and apostrophes, turns hyphens
/// into spaces, collapses whitespace, then drops generational suffixes from
/// the end only. Idempotent.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    suffixes: HashSet<String>,
}

impl NameNormalizer {
    pub fn new<S: AsRef<str>>(suffixes: &[S]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| fold(s.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(&config.matching.suffixes)
    }

    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = fold(raw);

        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        while tokens.last().is_some_and(|t| self.suffixes.contains(*t)) {
            tokens.pop();
        }

        tokens.join(" ")
    }
}

/// Character-level folding shared by names and configured suffixes:
/// lowercase, accents stripped, periods and apostrophes deleted, hyphens
/// turned into spaces. Surrounding whitespace is trimmed.
pub fn fold(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter_map(|c| match c {
            '.' | '\'' | '\u{2018}' | '\u{2019}' => None,
            '-' => Some(' '),
            other => Some(other),
        })
        .collect();
    folded.trim().to_string()
}

/// Maps team abbreviations onto the source's canonical codes.
/// Unknown codes pass through uppercased.
#[derive(Debug, Clone)]
pub struct TeamNormalizer {
    aliases: HashMap<String, String>,
}

impl TeamNormalizer {
    pub fn new<'a>(aliases: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(from, to)| (from.to_uppercase(), to.to_uppercase()))
                .collect(),
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(&config.teams.aliases)
    }

    pub fn normalize(&self, raw: &str) -> String {
        let code = raw.trim().to_uppercase();
        match self.aliases.get(&code) {
            Some(canonical) => canonical.clone(),
            None => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> NameNormalizer {
        NameNormalizer::from_config(&ReconConfig::default())
    }

    fn teams() -> TeamNormalizer {
        TeamNormalizer::from_config(&ReconConfig::default())
    }

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(names().normalize("Juan Soto"), "juan soto");
        assert_eq!(names().normalize("  Juan   Soto  "), "juan soto");
    }

    #[test]
    fn strips_accents() {
        let n = names();
        assert_eq!(n.normalize("José Ramírez"), "jose ramirez");
        assert_eq!(n.normalize("José Ramírez"), n.normalize("Jose Ramirez"));
        assert_eq!(n.normalize("Ñ. Carlos Jr."), "n carlos");
    }

    #[test]
    fn suffix_list_is_folded_like_names() {
        let n = NameNormalizer::new(&["Jr.", "III"]);
        assert_eq!(n.normalize("Bobby Witt Jr."), "bobby witt");
        assert_eq!(n.normalize("Lourdes Gurriel III"), "lourdes gurriel");
        assert_eq!(fold("  Jr. "), "jr");
    }

    #[test]
    fn punctuation() {
        let n = names();
        assert_eq!(n.normalize("T.J. Friedl"), "tj friedl");
        assert_eq!(n.normalize("Hyun-Jin Ryu"), "hyun jin ryu");
        assert_eq!(n.normalize("Ke'Bryan Hayes"), "kebryan hayes");
        assert_eq!(n.normalize("Ke\u{2019}Bryan Hayes"), "kebryan hayes");
        assert_eq!(n.normalize("Ke\u{2018}Bryan Hayes"), "kebryan hayes");
    }

    #[test]
    fn strips_trailing_suffixes() {
        let n = names();
        assert_eq!(n.normalize("Bobby Witt Jr."), "bobby witt");
        assert_eq!(n.normalize("Ken Griffey Sr"), "ken griffey");
        assert_eq!(n.normalize("Bobby Bradley II"), "bobby bradley");
        assert_eq!(n.normalize("Adley Rutschman III"), "adley rutschman");
        assert_eq!(n.normalize("Someone Jr. III"), "someone");
    }

    #[test]
    fn keeps_suffix_tokens_mid_name() {
        assert_eq!(names().normalize("V Jr Smith"), "v jr smith");
    }

    #[test]
    fn degenerate_inputs() {
        let n = names();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
        assert_eq!(n.normalize("Jr."), "");
    }

    #[test]
    fn idempotent() {
        let n = names();
        for raw in [
            "José Ramírez",
            "Bobby Witt Jr.",
            "Hyun-Jin Ryu",
            "  Ke\u{2019}Bryan   Hayes ",
            "Ñ. Carlos Jr.",
            "İbrahim Özdemir",
        ] {
            let once = n.normalize(raw);
            assert_eq!(n.normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn team_aliases() {
        let t = teams();
        assert_eq!(t.normalize("NYM"), "NYM");
        assert_eq!(t.normalize("WAS"), "WSH");
        assert_eq!(t.normalize("TBR"), "TB");
        assert_eq!(t.normalize("CHW"), "CWS");
        assert_eq!(t.normalize("nym"), "NYM");
        assert_eq!(t.normalize("  NYM  "), "NYM");
        assert_eq!(t.normalize("sfg"), "SF");
    }

    #[test]
    fn unknown_team_passes_through() {
        assert_eq!(teams().normalize("xyz"), "XYZ");
        assert_eq!(teams().normalize(""), "");
    }
}
