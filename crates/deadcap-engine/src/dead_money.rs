//! External dead money exports linked against rosters
//!
//! Contract exports arrive with free-form headers. They are standardized,
//! matched to roster lines on `(normalized name, team code, year)` and rolled
//! up per team. Unmatched rows are kept and flagged.

use crate::roster::{read_roster, RosterEntry};
use deadcap_core::table::write_records;
use deadcap_core::{
    normalize_name, normalize_team, parse_money, parse_year, Result, Table, TeamDeadMoney,
    WrittenFile,
};
use deadcap_staging::dataset::clean_header;
use deadcap_staging::DatasetKind;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

pub const PLAYER_DEAD_MONEY: &str = "player_dead_money.csv";
pub const TEAM_DEAD_MONEY_TOTALS: &str = "team_dead_money.csv";

pub const DEAD_MONEY_RECORD_COLUMNS: &[&str] = &[
    "player",
    "player_norm",
    "team",
    "year",
    "dead_money",
    "designation",
    "source",
    "matched",
];

/// One standardized dead money line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadMoneyRecord {
    pub player: String,
    pub player_norm: String,
    pub team: String,
    pub year: i32,
    pub dead_money: f64,
    pub designation: Option<String>,
    pub source: String,
    /// Whether a roster line matched this record
    pub matched: bool,
}

/// Standardize an external export.
///
/// Rows without a team or year, or with a non-positive amount, are dropped.
pub fn standardize_dead_money(table: &Table, source: &str) -> Vec<DeadMoneyRecord> {
    let mut table = table.clone();
    table.rename_headers(|h| DatasetKind::DeadMoney.canonical_column(&clean_header(h)));

    let mut records = Vec::new();
    for i in 0..table.len() {
        let player = table.get(i, "player_name").unwrap_or_default().trim().to_string();
        let team = normalize_team(table.get(i, "team").unwrap_or_default());
        let year = table.get(i, "year").and_then(parse_year);
        let dead_money = table.get(i, "dead_cap_millions").map(parse_money).unwrap_or(0.0);

        let Some(year) = year.filter(|_| !team.is_empty()) else {
            debug!(source, row = i + 1, "dead money row without team or year dropped");
            continue;
        };
        if dead_money <= 0.0 {
            debug!(source, row = i + 1, "non-positive dead money dropped");
            continue;
        }

        records.push(DeadMoneyRecord {
            player_norm: normalize_name(&player),
            player,
            team,
            year,
            dead_money,
            designation: table
                .get(i, "designation")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            source: source.to_string(),
            matched: false,
        });
    }
    records
}

/// Flag each record that has a roster line with the same normalized name,
/// team code and year
pub fn match_roster(records: &mut [DeadMoneyRecord], roster: &[RosterEntry]) -> usize {
    let keys: HashSet<(String, String, i32)> = roster
        .iter()
        .filter_map(|entry| {
            Some((
                normalize_name(&entry.player_name),
                normalize_team(&entry.team),
                entry.year?,
            ))
        })
        .collect();

    let mut matched = 0;
    for record in records.iter_mut() {
        let key = (record.player_norm.clone(), record.team.clone(), record.year);
        record.matched = keys.contains(&key);
        if record.matched {
            matched += 1;
        }
    }
    matched
}

/// Standardize a dead money export and match it to a roster export.
///
/// A missing export yields no records; a missing roster leaves every record
/// unmatched.
pub fn link_dead_money_to_roster(dead_money_csv: &Path, roster_csv: &Path) -> Result<Vec<DeadMoneyRecord>> {
    if !dead_money_csv.exists() {
        warn!(path = %dead_money_csv.display(), "dead money export not found");
        return Ok(Vec::new());
    }

    let source = dead_money_csv
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut records = standardize_dead_money(&Table::read(dead_money_csv)?, &source);

    match read_roster(roster_csv)? {
        Some(roster) => {
            let matched = match_roster(&mut records, &roster);
            info!(records = records.len(), matched, "dead money linked to roster");
        }
        None => warn!(path = %roster_csv.display(), "roster not found; records left unmatched"),
    }

    Ok(records)
}

/// Per-team totals sorted by year ascending, then dead money descending
pub fn team_dead_money_totals(records: &[DeadMoneyRecord]) -> Vec<TeamDeadMoney> {
    let mut totals: BTreeMap<(i32, String), f64> = BTreeMap::new();
    for record in records {
        *totals.entry((record.year, record.team.clone())).or_default() += record.dead_money;
    }

    let mut rows: Vec<TeamDeadMoney> = totals
        .into_iter()
        .map(|((year, team), dead_money_millions)| TeamDeadMoney {
            year,
            team,
            dead_money_millions,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then(b.dead_money_millions.total_cmp(&a.dead_money_millions))
    });
    rows
}

/// Write the player-level records and team totals into `dir`
pub fn write_linked(dir: &Path, records: &[DeadMoneyRecord]) -> Result<(WrittenFile, WrittenFile)> {
    let players = write_records(&dir.join(PLAYER_DEAD_MONEY), DEAD_MONEY_RECORD_COLUMNS, records)?;
    let teams = write_records(
        &dir.join(TEAM_DEAD_MONEY_TOTALS),
        crate::store::TEAM_DEAD_MONEY_COLUMNS,
        &team_dead_money_totals(records),
    )?;
    Ok((players, teams))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn export() -> Table {
        Table::from_reader(
            "Player Name,Tm,Season,Dead Cap Hit,Designation\n\
             Tom Brady,TB,2019,$1.5M,\n\
             Russell Wilson,DEN,2024,\"$85,000,000\",Post June 1\n\
             No Team,,2024,3,\n\
             Refund Guy,DAL,2024,(2),\n\
             Dak Prescott,Dallas Cowboys,2024,4.5,\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn standardize_drops_incomplete_rows() {
        let records = standardize_dead_money(&export(), "contracts.csv");

        let players: Vec<&str> = records.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(players, vec!["Tom Brady", "Russell Wilson", "Dak Prescott"]);
        assert_eq!(records[0].team, "TAM");
        assert_eq!(records[1].designation.as_deref(), Some("Post June 1"));
        assert_eq!(records[2].team, "DAL");
        assert_eq!(records[2].player_norm, "DAK PRESCOTT");
    }

    #[test]
    fn roster_match_requires_name_team_year() {
        let mut records = standardize_dead_money(&export(), "contracts.csv");
        let roster = vec![
            RosterEntry {
                player_name: "Tom Brady".to_string(),
                position: "QB".to_string(),
                team: "TAM".to_string(),
                year: Some(2019),
            },
            RosterEntry {
                player_name: "Dak Prescott".to_string(),
                position: "QB".to_string(),
                team: "DAL".to_string(),
                year: Some(2023),
            },
        ];

        let matched = match_roster(&mut records, &roster);

        assert_eq!(matched, 1);
        assert!(records[0].matched);
        assert!(!records[2].matched);
    }

    #[test]
    fn totals_sort_by_year_then_amount_desc() {
        let records = standardize_dead_money(&export(), "contracts.csv");
        let totals = team_dead_money_totals(&records);

        let order: Vec<(i32, &str)> = totals.iter().map(|t| (t.year, t.team.as_str())).collect();
        assert_eq!(order, vec![(2019, "TAM"), (2024, "DEN"), (2024, "DAL")]);
    }
}
