//! Reconciliation checks over processed tables
//!
//! Findings here are warnings only. They never fail a run.

use crate::linker::staged_files;
use crate::store::{ProcessedStore, FACT_CONTRACTS, TEAM_DEAD_MONEY};
use deadcap_core::{
    format_amount, normalize_team, parse_money, parse_year, ContractComponent, Diagnostic,
    IssueCode, Location, PipelineConfig, PipelineError, RunReport, SalaryType, Table, TeamCapSnapshot,
    TeamDeadMoney,
};
use deadcap_staging::DatasetKind;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Typed view of a staged team cap table. Money cells go through the
/// permissive parser; a missing column reads as zero.
pub fn team_cap_snapshots(table: &Table) -> Vec<TeamCapSnapshot> {
    let money = |i: usize, column: &str| table.get(i, column).map(parse_money).unwrap_or(0.0);

    (0..table.len())
        .map(|i| TeamCapSnapshot {
            team_name: table.get(i, "team_name").unwrap_or_default().trim().to_string(),
            year: table.get(i, "year").and_then(parse_year),
            active_cap_millions: money(i, "active_cap_millions"),
            dead_money_millions: money(i, "dead_money_millions"),
            salary_cap_millions: money(i, "salary_cap_millions"),
            cap_space_millions: money(i, "cap_space_millions"),
            dead_cap_pct: money(i, "dead_cap_pct"),
        })
        .collect()
}

/// Compare player-level dead money per team with team-level snapshots.
///
/// Teams are matched on `(year, canonical team code)`. Pairs that exist on
/// only one side are not reported.
pub fn reconcile_team_totals(
    rollup: &[TeamDeadMoney],
    snapshots: &[TeamCapSnapshot],
    tolerance_millions: f64,
) -> Vec<Diagnostic> {
    let mut team_level: BTreeMap<(i32, String), f64> = BTreeMap::new();
    for snapshot in snapshots {
        if let Some(year) = snapshot.year {
            team_level.insert((year, normalize_team(&snapshot.team_name)), snapshot.dead_money_millions);
        }
    }

    let mut player_level: BTreeMap<(i32, String), f64> = BTreeMap::new();
    for row in rollup {
        *player_level.entry((row.year, normalize_team(&row.team))).or_default() += row.dead_money_millions;
    }

    player_level
        .into_iter()
        .filter_map(|(key, players_total)| {
            let team_total = *team_level.get(&key)?;
            let gap = (players_total - team_total).abs();
            if gap <= tolerance_millions {
                return None;
            }
            let (year, team) = key;
            Some(
                Diagnostic::warn(
                    IssueCode::ReconcileTeamTotalMismatch,
                    format!(
                        "{} {}: player dead money {} differs from team figure {} by {}",
                        team,
                        year,
                        format_amount(players_total),
                        format_amount(team_total),
                        format_amount(gap)
                    ),
                )
                .with_location(Location::new(TEAM_DEAD_MONEY))
                .with_comparison(format_amount(team_total), format_amount(players_total)),
            )
        })
        .collect()
}

/// Report components sharing a `(player_id, team, year, salary_type)`
pub fn find_duplicate_components(components: &[ContractComponent]) -> Vec<Diagnostic> {
    let mut groups: BTreeMap<(&str, &str, i32, SalaryType), Vec<&str>> = BTreeMap::new();
    for c in components {
        groups
            .entry((c.player_id.as_str(), c.team.as_str(), c.year, c.salary_type))
            .or_default()
            .push(c.contract_id.as_str());
    }

    groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((player_id, team, year, salary_type), ids)| {
            Diagnostic::warn(
                IssueCode::ReconcileDuplicateComponent,
                format!(
                    "{} {} {} has {} {} components: {}",
                    player_id,
                    team,
                    year,
                    ids.len(),
                    salary_type,
                    ids.join(", ")
                ),
            )
            .with_location(Location::new(FACT_CONTRACTS))
        })
        .collect()
}

/// Runs both reconciliation checks against the current tables
#[derive(Debug, Clone)]
pub struct Reconciler {
    staging_dir: PathBuf,
    store: ProcessedStore,
    tolerance_millions: f64,
}

impl Reconciler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            staging_dir: config.staging_path(),
            store: ProcessedStore::new(config),
            tolerance_millions: config.reconcile.tolerance_millions,
        }
    }

    /// Absent tables are skipped with a log warning. Unreadable tables become
    /// `RECONCILE_UNREADABLE` warnings and the remaining checks still run.
    pub fn run(&self) -> RunReport {
        let mut diagnostics = Vec::new();
        let mut files_checked = 0;

        match self.store.try_load_contracts() {
            Ok(Some(contracts)) => {
                files_checked += 1;
                diagnostics.extend(find_duplicate_components(&contracts));
            }
            Ok(None) => warn!("contract fact table missing; duplicate check skipped"),
            Err(err) => diagnostics.push(unreadable(&self.store.path(FACT_CONTRACTS), &err)),
        }

        match self.store.try_load_team_dead_money() {
            Ok(Some(rollup)) => {
                files_checked += 1;
                let mut snapshots = Vec::new();
                for path in staged_files(&self.staging_dir, DatasetKind::TeamCap) {
                    files_checked += 1;
                    match Table::read(&path) {
                        Ok(table) => snapshots.extend(team_cap_snapshots(&table)),
                        Err(err) => diagnostics.push(unreadable(&path, &err)),
                    }
                }
                diagnostics.extend(reconcile_team_totals(&rollup, &snapshots, self.tolerance_millions));
            }
            Ok(None) => warn!("team dead money rollup missing; team totals check skipped"),
            Err(err) => diagnostics.push(unreadable(&self.store.path(TEAM_DEAD_MONEY), &err)),
        }

        let report = RunReport::from_diagnostics("reconcile", files_checked, diagnostics);
        info!(
            files_checked,
            warnings = report.summary.warnings,
            "reconciliation finished"
        );
        report
    }
}

fn unreadable(path: &Path, err: &PipelineError) -> Diagnostic {
    warn!(path = %path.display(), error = %err, "reconciliation input unreadable");
    Diagnostic::warn(
        IssueCode::ReconcileUnreadable,
        format!("Unreadable table {}: {}", path.display(), err),
    )
    .with_location(Location::from_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadcap_core::ContractStatus;
    use pretty_assertions::assert_eq;

    fn snapshot(team_name: &str, year: i32, dead: f64) -> TeamCapSnapshot {
        TeamCapSnapshot {
            team_name: team_name.to_string(),
            year: Some(year),
            active_cap_millions: 0.0,
            dead_money_millions: dead,
            salary_cap_millions: 255.4,
            cap_space_millions: 0.0,
            dead_cap_pct: 0.0,
        }
    }

    fn rollup(team: &str, year: i32, dead: f64) -> TeamDeadMoney {
        TeamDeadMoney {
            year,
            team: team.to_string(),
            dead_money_millions: dead,
        }
    }

    #[test]
    fn mismatch_beyond_tolerance_warns() {
        let diags = reconcile_team_totals(
            &[rollup("TB", 2024, 10.0), rollup("DAL", 2024, 5.05)],
            &[
                snapshot("Tampa Bay Buccaneers", 2024, 12.0),
                snapshot("Dallas Cowboys", 2024, 5.0),
            ],
            0.1,
        );

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, IssueCode::ReconcileTeamTotalMismatch);
        assert!(diags[0].message.starts_with("TAM 2024"));
        assert_eq!(diags[0].expected.as_deref(), Some("12.0"));
        assert_eq!(diags[0].actual.as_deref(), Some("10.0"));
    }

    #[test]
    fn one_sided_teams_are_ignored() {
        let diags = reconcile_team_totals(&[rollup("NYJ", 2023, 40.0)], &[snapshot("DAL", 2023, 1.0)], 0.1);
        assert!(diags.is_empty());
    }

    #[test]
    fn duplicate_components_are_reported() {
        let component = |contract_id: &str| ContractComponent {
            contract_id: contract_id.to_string(),
            player_id: "PFR_A_DAL_2024".to_string(),
            team: "DAL".to_string(),
            year: 2024,
            salary_type: SalaryType::SigningBonus,
            amount_millions: 1.0,
            designation: None,
            status: ContractStatus::Active,
        };

        let diags = find_duplicate_components(&[component("c1"), component("c2")]);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("c1, c2"));

        assert!(find_duplicate_components(&[component("c1")]).is_empty());
    }

    #[test]
    fn snapshots_from_staged_table() {
        let table = Table::from_reader(
            "team_name,year,dead_money_millions\nDallas Cowboys,2024,22.5\nNYJ,,1\n".as_bytes(),
        )
        .unwrap();

        let snapshots = team_cap_snapshots(&table);
        assert_eq!(snapshots[0].dead_money_millions, 22.5);
        assert_eq!(snapshots[0].salary_cap_millions, 0.0);
        assert_eq!(snapshots[1].year, None);
    }
}
