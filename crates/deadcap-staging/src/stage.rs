//! Raw → staging normalization
//!
//! Reads one raw export per (dataset, year), canonicalizes headers, coerces
//! money and year columns and writes `stg_spotrac_<dataset>_<year>.csv`.
//! Absent raw files are expected and reported as [`StageOutcome::NotFound`].

use crate::dataset::{clean_header, DatasetKind};
use deadcap_core::model::dead_cap_pct;
use deadcap_core::{format_amount, parse_money, parse_year, PipelineConfig, PipelineError, Result, Table, WrittenFile};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What happened to one (dataset, year)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Staging file written
    Staged(WrittenFile),

    /// No raw file for this year; nothing written
    NotFound { path: PathBuf },

    /// Raw file exists but is not readable CSV; nothing written
    Unreadable { path: PathBuf, reason: String },
}

impl StageOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, Self::Staged(_))
    }

    /// Staged file summary, if one was written
    pub fn written(&self) -> Option<&WrittenFile> {
        match self {
            Self::Staged(written) => Some(written),
            _ => None,
        }
    }
}

/// Raw → staging normalizer bound to one run's directories
#[derive(Debug, Clone)]
pub struct StagingNormalizer {
    raw_dir: PathBuf,
    staging_dir: PathBuf,
}

impl StagingNormalizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            raw_dir: config.raw_path(),
            staging_dir: config.staging_path(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Stage a team cap snapshot. Without a snapshot date the latest snapshot
    /// for the year is used.
    pub fn stage_team_cap(&self, year: i32, snapshot: Option<&str>) -> Result<StageOutcome> {
        self.stage(DatasetKind::TeamCap, year, snapshot)
    }

    pub fn stage_player_rankings(&self, year: i32) -> Result<StageOutcome> {
        self.stage(DatasetKind::PlayerRankings, year, None)
    }

    pub fn stage_dead_money(&self, year: i32) -> Result<StageOutcome> {
        self.stage(DatasetKind::DeadMoney, year, None)
    }

    /// Stage every dataset kind for a year
    pub fn stage_all(&self, year: i32, snapshot: Option<&str>) -> Result<Vec<(DatasetKind, StageOutcome)>> {
        DatasetKind::ALL
            .iter()
            .map(|&kind| Ok((kind, self.stage(kind, year, snapshot)?)))
            .collect()
    }

    /// Stage one (dataset, year)
    pub fn stage(&self, kind: DatasetKind, year: i32, snapshot: Option<&str>) -> Result<StageOutcome> {
        std::fs::create_dir_all(&self.staging_dir)
            .map_err(|e| PipelineError::io(&self.staging_dir, e))?;

        let raw_path = self.raw_path(kind, year, snapshot);
        if !raw_path.exists() {
            warn!(dataset = %kind, year, path = %raw_path.display(), "raw file not found");
            return Ok(StageOutcome::NotFound { path: raw_path });
        }

        let raw = match Table::read(&raw_path) {
            Ok(table) => table,
            Err(err) => {
                warn!(dataset = %kind, year, path = %raw_path.display(), error = %err, "raw file unreadable");
                return Ok(StageOutcome::Unreadable {
                    path: raw_path,
                    reason: err.to_string(),
                });
            }
        };

        let staged = normalize_table(kind, year, raw);
        let out_path = self.staging_dir.join(kind.staged_file_name(year));
        let written = staged.write(&out_path)?;

        info!(
            dataset = %kind,
            year,
            path = %written.path.display(),
            rows = written.rows,
            "staged"
        );
        Ok(StageOutcome::Staged(written))
    }

    /// Raw file location for a (dataset, year, snapshot)
    pub fn raw_path(&self, kind: DatasetKind, year: i32, snapshot: Option<&str>) -> PathBuf {
        if kind == DatasetKind::TeamCap && snapshot.is_none() {
            if let Some(latest) = self.latest_snapshot(year) {
                return latest;
            }
        }
        self.raw_dir.join(kind.raw_file_name(year, snapshot))
    }

    /// Lexicographically greatest `spotrac_team_cap_<year>_*.csv` in the raw directory
    pub fn latest_snapshot(&self, year: i32) -> Option<PathBuf> {
        let prefix = DatasetKind::TeamCap.snapshot_prefix(year);

        WalkDir::new(&self.raw_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(".csv")
            })
            .map(|e| e.into_path())
            .max()
    }
}

/// Canonicalize a raw table into its staging schema.
///
/// Pure and deterministic: the same raw table always yields the same output.
pub fn normalize_table(kind: DatasetKind, year: i32, mut table: Table) -> Table {
    table.rename_headers(|raw| kind.canonical_column(&clean_header(raw)));

    for column in kind.money_columns() {
        table.map_column(column, |cell| format_amount(parse_money(cell)));
    }

    if kind == DatasetKind::TeamCap && !table.has_column("dead_cap_pct") {
        debug!(year, "deriving dead_cap_pct");
        table.set_column("dead_cap_pct", |t, i| {
            let dead = t.get(i, "dead_money_millions").map(parse_money).unwrap_or(0.0);
            let cap = t.get(i, "salary_cap_millions").map(parse_money).unwrap_or(0.0);
            format_amount(dead_cap_pct(dead, cap))
        });
    }

    if table.has_column("year") {
        table.map_column("year", |cell| {
            parse_year(cell).map(|y| y.to_string()).unwrap_or_default()
        });
    } else {
        warn!(dataset = %kind, year, "raw file has no year column; staged years left empty");
        table.set_column("year", |_, _| String::new());
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(csv_text: &str) -> Table {
        Table::from_reader(csv_text.as_bytes()).unwrap()
    }

    #[test]
    fn team_cap_headers_and_money() {
        let raw = table(
            " Team ,Year,Active_Cap_Millions,Dead_Money_Millions,Salary_Cap_Millions\n\
             Green Bay Packers,2024,\"$200.5\",(4.5),255.4\n",
        );

        let staged = normalize_table(DatasetKind::TeamCap, 2024, raw);

        assert_eq!(
            staged.headers(),
            &[
                "team_name",
                "year",
                "active_cap_millions",
                "dead_money_millions",
                "salary_cap_millions",
                "dead_cap_pct",
            ]
            .map(String::from)
        );
        assert_eq!(staged.get(0, "active_cap_millions"), Some("200.5"));
        assert_eq!(staged.get(0, "dead_money_millions"), Some("-4.5"));
        assert_eq!(staged.get(0, "year"), Some("2024"));
    }

    #[test]
    fn dead_cap_pct_is_derived_when_absent() {
        let raw = table("team,year,dead_money_millions,salary_cap_millions\nDAL,2023,22.4,224\nNYJ,2023,5,0\n");
        let staged = normalize_table(DatasetKind::TeamCap, 2023, raw);

        let pct: f64 = staged.get(0, "dead_cap_pct").unwrap().parse().unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
        assert_eq!(staged.get(1, "dead_cap_pct"), Some("0.0"));
    }

    #[test]
    fn dead_money_aliases_and_bad_values() {
        let raw = table("Player,Team,Year,Dead Cap Hit\nTom Brady,TB,2019.0,$1.5M\nNobody,NE,,n/a\n");
        let staged = normalize_table(DatasetKind::DeadMoney, 2019, raw);

        assert_eq!(
            staged.headers(),
            &["player_name", "team", "year", "dead_cap_millions"].map(String::from)
        );
        assert_eq!(staged.get(0, "dead_cap_millions"), Some("1.5"));
        assert_eq!(staged.get(0, "year"), Some("2019"));
        assert_eq!(staged.get(1, "year"), Some(""));
        assert_eq!(staged.get(1, "dead_cap_millions"), Some("0.0"));
    }

    #[test]
    fn missing_year_column_stays_empty() {
        let raw = table("player_name,team,cap_total_millions\nA,DAL,10\n");
        let staged = normalize_table(DatasetKind::PlayerRankings, 2022, raw);
        assert!(staged.has_column("year"));
        assert_eq!(staged.get(0, "year"), Some(""));
    }
}
