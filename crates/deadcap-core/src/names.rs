//! Player name and team code normalization
//!
//! These functions define the join keys shared by every source. Changing their
//! output changes which rows link, so they are covered by tests below and in
//! the engine's integration suite.

use regex::Regex;
use std::sync::OnceLock;

/// Generational suffixes dropped from player names
const NAME_SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV"];

/// Full franchise names (uppercased) to canonical team codes
const FRANCHISE_CODES: &[(&str, &str)] = &[
    ("ARIZONA CARDINALS", "ARI"),
    ("ATLANTA FALCONS", "ATL"),
    ("BALTIMORE RAVENS", "BAL"),
    ("BUFFALO BILLS", "BUF"),
    ("CAROLINA PANTHERS", "CAR"),
    ("CHICAGO BEARS", "CHI"),
    ("CINCINNATI BENGALS", "CIN"),
    ("CLEVELAND BROWNS", "CLE"),
    ("DALLAS COWBOYS", "DAL"),
    ("DENVER BRONCOS", "DEN"),
    ("DETROIT LIONS", "DET"),
    ("GREEN BAY PACKERS", "GNB"),
    ("HOUSTON TEXANS", "HOU"),
    ("INDIANAPOLIS COLTS", "IND"),
    ("JACKSONVILLE JAGUARS", "JAX"),
    ("KANSAS CITY CHIEFS", "KAN"),
    ("LOS ANGELES CHARGERS", "LAC"),
    ("LOS ANGELES RAMS", "LAR"),
    ("LAS VEGAS RAIDERS", "LVR"),
    ("MIAMI DOLPHINS", "MIA"),
    ("MINNESOTA VIKINGS", "MIN"),
    ("NEW ENGLAND PATRIOTS", "NWE"),
    ("NEW ORLEANS SAINTS", "NOR"),
    ("NEW YORK GIANTS", "NYG"),
    ("NEW YORK JETS", "NYJ"),
    ("PHILADELPHIA EAGLES", "PHI"),
    ("PITTSBURGH STEELERS", "PIT"),
    ("SAN FRANCISCO 49ERS", "SFO"),
    ("SEATTLE SEAHAWKS", "SEA"),
    ("TAMPA BAY BUCCANEERS", "TAM"),
    ("TENNESSEE TITANS", "TEN"),
    ("WASHINGTON COMMANDERS", "WAS"),
];

/// Short codes used by some sources, mapped to the canonical PFR code
const CODE_ALIASES: &[(&str, &str)] = &[
    ("GB", "GNB"),
    ("KC", "KAN"),
    ("NO", "NOR"),
    ("NE", "NWE"),
    ("TB", "TAM"),
    ("SF", "SFO"),
    ("LV", "LVR"),
];

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9]+").expect("static regex is valid"))
}

/// Normalize a player name into its join key.
///
/// Uppercases, replaces every run of non-alphanumeric characters with a
/// single space, drops generational suffix tokens (`JR`, `SR`, `II`, `III`,
/// `IV`, with or without a trailing period) and collapses whitespace.
/// The result is idempotent.
pub fn normalize_name(name: &str) -> String {
    let upper = name.to_uppercase();
    let spaced = non_alnum().replace_all(&upper, " ");

    spaced
        .split_whitespace()
        .filter(|token| !NAME_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical team code for a full franchise name or short code.
///
/// Unknown inputs come back trimmed but otherwise unchanged; no code is
/// invented for them.
pub fn normalize_team(team: &str) -> String {
    let trimmed = team.trim();
    let upper = trimmed.to_uppercase();

    if let Some(code) = lookup(FRANCHISE_CODES, &upper) {
        return code.to_string();
    }

    let code = lookup(CODE_ALIASES, &upper).unwrap_or(upper.as_str());
    if is_known_code(code) {
        code.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether `code` is one of the 32 canonical team codes
pub fn is_known_code(code: &str) -> bool {
    FRANCHISE_CODES.iter().any(|(_, known)| *known == code)
}

fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_normalization() {
        assert_eq!(normalize_name("Odell Beckham Jr."), "ODELL BECKHAM");
        assert_eq!(normalize_name("Robert Griffin III"), "ROBERT GRIFFIN");
        assert_eq!(normalize_name("  D'Andre   Swift "), "D ANDRE SWIFT");
        assert_eq!(normalize_name("Ja'Marr Chase"), "JA MARR CHASE");
        assert_eq!(normalize_name("tom brady"), "TOM BRADY");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn suffix_only_removed_as_whole_token() {
        assert_eq!(normalize_name("Ivan Jrue"), "IVAN JRUE");
        assert_eq!(normalize_name("Srinivas Ivory"), "SRINIVAS IVORY");
        assert_eq!(normalize_name("Marvin Jones Sr"), "MARVIN JONES");
    }

    #[test]
    fn name_normalization_is_idempotent() {
        let samples = [
            "Odell Beckham Jr.",
            "Patrick Mahomes II",
            "A.J. Green",
            "smith_jr",
            "José  Núñez IV",
            "  ",
            "T.J. Watt, Sr.",
        ];

        for sample in samples {
            let once = normalize_name(sample);
            assert_eq!(normalize_name(&once), once, "input: {sample}");
        }
    }

    #[test]
    fn team_codes() {
        assert_eq!(normalize_team("GB"), "GNB");
        assert_eq!(normalize_team("Green Bay Packers"), "GNB");
        assert_eq!(normalize_team("GB"), normalize_team("Green Bay Packers"));
        assert_eq!(normalize_team("kc"), "KAN");
        assert_eq!(normalize_team("TB"), "TAM");
        assert_eq!(normalize_team("Las Vegas Raiders"), "LVR");
        assert_eq!(normalize_team("DAL"), "DAL");
    }

    #[test]
    fn unknown_team_passes_through() {
        assert_eq!(normalize_team("Oakland Raiders"), "Oakland Raiders");
        assert_eq!(normalize_team(" XYZ "), "XYZ");
        assert_eq!(normalize_team(""), "");
    }
}
