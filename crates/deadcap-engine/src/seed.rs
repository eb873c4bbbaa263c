//! Roster seeding of the player dimension and base contract rows

use crate::aggregator::write_marts;
use crate::roster::read_roster;
use crate::store::ProcessedStore;
use deadcap_core::model::synthetic_player_id;
use deadcap_core::{
    ContractComponent, ContractStatus, PipelineConfig, Player, Result, SalaryType, UpsertLog,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters from one seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub roster_found: bool,
    pub roster_rows: usize,
    /// Rows without a year
    pub skipped: usize,
    pub players: usize,
    pub contracts: usize,
}

/// Seed `dim_players.csv` and `fact_player_contracts.csv` from a roster export.
///
/// Each roster line becomes a player keyed `PFR_<NAME>_<TEAM>_<YEAR>` and a
/// zero-amount `base_salary` component keyed `<player_id>_base`. Existing
/// rows with the same key are replaced. The dimension is written once, after
/// every line is processed, and the marts are recomputed.
pub fn seed_from_roster(config: &PipelineConfig, roster_csv: &Path) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let Some(roster) = read_roster(roster_csv)? else {
        warn!(path = %roster_csv.display(), "roster not found; nothing seeded");
        return Ok(summary);
    };
    summary.roster_found = true;
    summary.roster_rows = roster.len();

    let store = ProcessedStore::new(config);
    let mut players = UpsertLog::from_records(store.try_load_players()?.unwrap_or_default());
    let mut contracts = UpsertLog::from_records(store.try_load_contracts()?.unwrap_or_default());

    for entry in roster {
        let Some(year) = entry.year else {
            debug!(player = %entry.player_name, "roster row without a year skipped");
            summary.skipped += 1;
            continue;
        };

        let player_id = synthetic_player_id(&entry.player_name, &entry.team, year);
        contracts.upsert(ContractComponent {
            contract_id: format!("{}_base", player_id),
            player_id: player_id.clone(),
            team: entry.team,
            year,
            salary_type: SalaryType::BaseSalary,
            amount_millions: 0.0,
            designation: None,
            status: ContractStatus::Active,
        });
        players.upsert(Player::new(player_id, entry.player_name, entry.position));
    }

    let players = players.into_records();
    let contracts = contracts.into_records();
    store.save_players(&players)?;
    store.save_contracts(&contracts)?;
    write_marts(&store, &contracts)?;

    summary.players = players.len();
    summary.contracts = contracts.len();
    info!(
        players = summary.players,
        contracts = summary.contracts,
        skipped = summary.skipped,
        "roster seeded"
    );
    Ok(summary)
}
