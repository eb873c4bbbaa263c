//! Dataset kinds and their canonical staging schemas
//!
//! Each raw export family has a file naming scheme, a header alias map and a
//! set of money columns. Headers are compared after trimming and lowercasing.

use serde::{Deserialize, Serialize};

/// Raw dataset families handled by the staging layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Team cap snapshot (one row per team)
    TeamCap,

    /// Player cap rankings
    PlayerRankings,

    /// Player dead money hits
    DeadMoney,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [Self::TeamCap, Self::PlayerRankings, Self::DeadMoney];

    /// Stable slug used in file names
    pub fn slug(&self) -> &'static str {
        match self {
            Self::TeamCap => "team_cap",
            Self::PlayerRankings => "player_rankings",
            Self::DeadMoney => "dead_money",
        }
    }

    /// Raw file name. Only team cap exports carry a snapshot suffix.
    pub fn raw_file_name(&self, year: i32, snapshot: Option<&str>) -> String {
        match (self, snapshot) {
            (Self::TeamCap, Some(snapshot)) => {
                format!("spotrac_{}_{}_{}.csv", self.slug(), year, snapshot)
            }
            _ => format!("spotrac_{}_{}.csv", self.slug(), year),
        }
    }

    /// Prefix shared by every snapshot of a year's team cap export
    pub fn snapshot_prefix(&self, year: i32) -> String {
        format!("spotrac_{}_{}_", self.slug(), year)
    }

    /// Staging file name for a year
    pub fn staged_file_name(&self, year: i32) -> String {
        format!("{}{}.csv", self.staged_prefix(), year)
    }

    /// Prefix shared by every staged file of this kind
    pub fn staged_prefix(&self) -> String {
        format!("stg_spotrac_{}_", self.slug())
    }

    /// Map a trimmed, lowercased raw header to its canonical staging name
    pub fn canonical_column(&self, header: &str) -> String {
        let canonical = match self {
            Self::TeamCap => match header {
                "team" | "team name" | "tm" => "team_name",
                "season" => "year",
                "active cap" | "active_cap" => "active_cap_millions",
                "dead money" | "dead_money" | "dead cap" => "dead_money_millions",
                "salary cap" | "salary_cap" => "salary_cap_millions",
                "cap space" | "cap_space" => "cap_space_millions",
                "dead cap %" | "dead_cap_percent" => "dead_cap_pct",
                other => other,
            },
            Self::PlayerRankings => match header {
                "player" | "player name" | "name" => "player_name",
                "pos" => "position",
                "tm" | "team_name" => "team",
                "season" => "year",
                "cap total" | "cap_total" => "cap_total_millions",
                "cap hit" | "cap_hit" => "cap_hit_millions",
                other => other,
            },
            Self::DeadMoney => match header {
                "player" | "player name" | "name" => "player_name",
                "pos" => "position",
                "tm" | "team_name" => "team",
                "season" => "year",
                "dead_cap_hit" | "dead cap hit" | "dead money" | "dead_money" | "dead cap"
                | "dead$" | "deadcap" => "dead_cap_millions",
                "type" | "status" => "designation",
                other => other,
            },
        };
        canonical.to_string()
    }

    /// Columns coerced through the permissive money parser
    pub fn money_columns(&self) -> &'static [&'static str] {
        match self {
            Self::TeamCap => &[
                "active_cap_millions",
                "dead_money_millions",
                "salary_cap_millions",
                "cap_space_millions",
                "dead_cap_pct",
            ],
            Self::PlayerRankings => &["cap_total_millions", "cap_hit_millions"],
            Self::DeadMoney => &["dead_cap_millions"],
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Trim, drop a UTF-8 byte order mark and lowercase a raw header
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(
            DatasetKind::TeamCap.raw_file_name(2024, Some("2024-03-01")),
            "spotrac_team_cap_2024_2024-03-01.csv"
        );
        assert_eq!(
            DatasetKind::PlayerRankings.raw_file_name(2023, Some("ignored")),
            "spotrac_player_rankings_2023.csv"
        );
        assert_eq!(
            DatasetKind::DeadMoney.staged_file_name(2019),
            "stg_spotrac_dead_money_2019.csv"
        );
        assert_eq!(DatasetKind::TeamCap.staged_prefix(), "stg_spotrac_team_cap_");
    }

    #[test]
    fn alias_maps() {
        assert_eq!(DatasetKind::TeamCap.canonical_column("team"), "team_name");
        assert_eq!(DatasetKind::DeadMoney.canonical_column("dead_cap_hit"), "dead_cap_millions");
        assert_eq!(DatasetKind::DeadMoney.canonical_column("dead money"), "dead_cap_millions");
        assert_eq!(DatasetKind::DeadMoney.canonical_column("player"), "player_name");
        assert_eq!(DatasetKind::PlayerRankings.canonical_column("team"), "team");
        assert_eq!(DatasetKind::PlayerRankings.canonical_column("unknown"), "unknown");
    }

    #[test]
    fn header_cleaning() {
        assert_eq!(clean_header("\u{feff} Team "), "team");
        assert_eq!(clean_header("Dead Cap Hit"), "dead cap hit");
    }
}
