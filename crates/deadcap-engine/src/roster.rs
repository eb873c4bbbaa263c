//! Roster exports used for identity resolution
//!
//! A roster needs only a player-name column. Position, team and year columns
//! are picked up under their common spellings when present.

use deadcap_core::{parse_year, Result, Table};
use deadcap_staging::dataset::clean_header;
use std::path::Path;
use tracing::debug;

/// Placeholder for an absent position or team
pub const UNKNOWN: &str = "UNK";

/// One roster line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_name: String,
    pub position: String,
    pub team: String,
    pub year: Option<i32>,
}

/// Read a roster export. Returns `None` if the file does not exist.
pub fn read_roster(path: &Path) -> Result<Option<Vec<RosterEntry>>> {
    if !path.exists() {
        return Ok(None);
    }
    let table = Table::read(path)?;
    Ok(Some(roster_entries(&table)))
}

/// Extract roster entries from a loosely shaped table.
///
/// Rows with a blank name are dropped.
pub fn roster_entries(table: &Table) -> Vec<RosterEntry> {
    let find = |aliases: &[&str]| {
        table
            .headers()
            .iter()
            .position(|h| aliases.contains(&clean_header(h).as_str()))
    };

    let name_idx = find(&["player", "player_name", "player name", "name"])
        .or(if table.headers().is_empty() { None } else { Some(0) });
    let pos_idx = find(&["pos", "position"]);
    let team_idx = find(&["team", "tm"]);
    let year_idx = find(&["year", "season"]);

    let Some(name_idx) = name_idx else {
        return Vec::new();
    };

    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.map(|i| row[i].trim().to_string()).unwrap_or_default()
    };
    let or_unknown = |value: String| {
        if value.is_empty() {
            UNKNOWN.to_string()
        } else {
            value
        }
    };

    table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let player_name = row[name_idx].trim().to_string();
            if player_name.is_empty() {
                debug!(row = i + 1, "roster row without a name skipped");
                return None;
            }
            Some(RosterEntry {
                player_name,
                position: or_unknown(cell(row, pos_idx)),
                team: or_unknown(cell(row, team_idx).to_uppercase()),
                year: year_idx.and_then(|idx| parse_year(&row[idx])),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pfr_style_headers() {
        let table =
            Table::from_reader("Player,Pos,Tm,Season\nTom Brady,QB,tb,2019\n,WR,TB,2019\n".as_bytes())
                .unwrap();

        assert_eq!(
            roster_entries(&table),
            vec![RosterEntry {
                player_name: "Tom Brady".to_string(),
                position: "QB".to_string(),
                team: "TB".to_string(),
                year: Some(2019),
            }]
        );
    }

    #[test]
    fn first_column_is_the_name_fallback() {
        let table = Table::from_reader("Name Col,Age\nAaron Rodgers,40\n".as_bytes()).unwrap();
        let entries = roster_entries(&table);

        assert_eq!(entries[0].player_name, "Aaron Rodgers");
        assert_eq!(entries[0].position, UNKNOWN);
        assert_eq!(entries[0].team, UNKNOWN);
        assert_eq!(entries[0].year, None);
    }

    #[test]
    fn missing_roster_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_roster(&dir.path().join("rosters.csv")).unwrap().is_none());
    }
}
