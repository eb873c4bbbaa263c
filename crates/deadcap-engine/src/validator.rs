//! Staging validation
//!
//! Runs coarse checks over every staged file before normalization reads it.
//! All findings are collected first; any error-level finding fails the run
//! with one [`PipelineError::StagingValidation`] listing every issue.

use crate::linker::staged_files;
use deadcap_core::{
    parse_money, parse_year, Diagnostic, IssueCode, Location, PipelineConfig, PipelineError,
    Result, RunReport, Table,
};
use deadcap_core::config::ValidationRules;
use deadcap_staging::DatasetKind;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Staging validator bound to one run's staging directory
#[derive(Debug, Clone)]
pub struct StagingValidator {
    staging_dir: PathBuf,
    rules: ValidationRules,
}

impl StagingValidator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            staging_dir: config.staging_path(),
            rules: config.validation.clone(),
        }
    }

    /// Check every staged file and return the report without failing
    pub fn inspect(&self) -> RunReport {
        let mut diagnostics = Vec::new();
        let mut files_checked = 0;

        for kind in DatasetKind::ALL {
            for path in staged_files(&self.staging_dir, kind) {
                files_checked += 1;
                match Table::read(&path) {
                    Ok(table) => diagnostics.extend(self.check(kind, &path, &table)),
                    Err(err) => diagnostics.push(
                        Diagnostic::error(
                            IssueCode::StagingUnreadable,
                            format!("Unreadable staging file {}: {}", path.display(), err),
                        )
                        .with_location(Location::from_path(&path)),
                    ),
                }
            }
        }

        RunReport::from_diagnostics("validate", files_checked, diagnostics)
    }

    /// Check every staged file; fail with all issues if any check failed
    pub fn validate(&self) -> Result<RunReport> {
        let report = self.inspect();

        if report.has_errors() {
            let issues = report.error_lines();
            for issue in &issues {
                warn!("{}", issue);
            }
            return Err(PipelineError::StagingValidation { issues });
        }

        info!(files_checked = report.summary.files_checked, "staging validation passed");
        Ok(report)
    }

    /// Findings for one staged file
    pub fn check(&self, kind: DatasetKind, path: &Path, table: &Table) -> Vec<Diagnostic> {
        match kind {
            DatasetKind::TeamCap => self.check_team_cap(path, table),
            DatasetKind::PlayerRankings => self.check_player_rankings(path, table),
            DatasetKind::DeadMoney => check_dead_money(path, table),
        }
    }

    fn check_team_cap(&self, path: &Path, table: &Table) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let location = Location::from_path(path);

        let teams: HashSet<&str> = table
            .column("team_name")
            .map(|cells| cells.map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        if teams.len() < self.rules.min_distinct_teams {
            diagnostics.push(
                Diagnostic::error(
                    IssueCode::StagingLowTeamCount,
                    format!("Low team count in {}: {}", path.display(), teams.len()),
                )
                .with_location(location.clone())
                .with_comparison(
                    format!(">= {}", self.rules.min_distinct_teams),
                    teams.len().to_string(),
                ),
            );
        }

        let first_null = match table.column("year") {
            Some(mut years) => years.position(|y| parse_year(y).is_none()),
            None if table.is_empty() => None,
            None => Some(0),
        };
        if let Some(row) = first_null {
            diagnostics.push(
                Diagnostic::error(
                    IssueCode::StagingNullYear,
                    format!("Null year values in {}", path.display()),
                )
                .with_location(location.with_row(row + 1)),
            );
        }

        diagnostics
    }

    fn check_player_rankings(&self, path: &Path, table: &Table) -> Vec<Diagnostic> {
        let missing: Vec<&str> = self
            .rules
            .required_ranking_columns
            .iter()
            .map(String::as_str)
            .filter(|c| !table.has_column(c))
            .collect();

        if missing.is_empty() {
            return Vec::new();
        }

        vec![Diagnostic::error(
            IssueCode::StagingMissingColumns,
            format!("Missing columns in {}: {}", path.display(), missing.join(", ")),
        )
        .with_location(Location::from_path(path))]
    }
}

fn check_dead_money(path: &Path, table: &Table) -> Vec<Diagnostic> {
    let location = Location::from_path(path);

    let Some(amounts) = table.column("dead_cap_millions") else {
        return vec![Diagnostic::error(
            IssueCode::StagingMissingColumns,
            format!("Missing columns in {}: dead_cap_millions", path.display()),
        )
        .with_location(location)];
    };

    let negative: Vec<usize> = amounts
        .enumerate()
        .filter(|(_, amount)| parse_money(amount) < 0.0)
        .map(|(i, _)| i + 1)
        .collect();

    match negative.first() {
        Some(&row) => vec![Diagnostic::error(
            IssueCode::StagingNegativeDeadMoney,
            format!(
                "Negative dead money in {} ({} rows)",
                path.display(),
                negative.len()
            ),
        )
        .with_location(location.with_row(row))],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> StagingValidator {
        StagingValidator::new(&PipelineConfig::rooted_at("/unused"))
    }

    fn table(text: &str) -> Table {
        Table::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn low_team_count_is_flagged() {
        let diags = validator().check(
            DatasetKind::TeamCap,
            Path::new("stg_spotrac_team_cap_2024.csv"),
            &table("team_name,year\nDAL,2024\nNYG,2024\n"),
        );

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, IssueCode::StagingLowTeamCount);
        assert_eq!(diags[0].actual.as_deref(), Some("2"));
    }

    #[test]
    fn missing_ranking_columns_are_listed() {
        let diags = validator().check(
            DatasetKind::PlayerRankings,
            Path::new("stg_spotrac_player_rankings_2024.csv"),
            &table("player_name,year\nA,2024\n"),
        );

        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("team, cap_total_millions"));
    }

    #[test]
    fn negative_dead_money_is_flagged() {
        let diags = validator().check(
            DatasetKind::DeadMoney,
            Path::new("stg_spotrac_dead_money_2024.csv"),
            &table("player_name,dead_cap_millions\nA,1.0\nB,-2.0\nC,0.0\n"),
        );

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, IssueCode::StagingNegativeDeadMoney);
        assert_eq!(diags[0].location.as_ref().and_then(|l| l.row), Some(2));
    }

    #[test]
    fn clean_dead_money_passes() {
        let diags = validator().check(
            DatasetKind::DeadMoney,
            Path::new("stg_spotrac_dead_money_2024.csv"),
            &table("player_name,dead_cap_millions\nA,1.0\n"),
        );
        assert!(diags.is_empty());
    }
}
