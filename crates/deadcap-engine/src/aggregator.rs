//! Contract / cap-impact aggregation
//!
//! Dead money from an external export is merged into the contract fact table,
//! then both marts are recomputed from the complete fact table. Marts are
//! never patched in place.

use crate::linker::{IdentityResolver, LinkQuery, PrefixHeuristicResolver};
use crate::store::ProcessedStore;
use deadcap_core::{
    parse_money, parse_year, ContractComponent, ContractStatus, ImpactKey, PipelineConfig,
    PlayerCapImpact, Result, SalaryType, Table, TeamDeadMoney, UpsertLog, WrittenFile,
};
use deadcap_staging::dataset::clean_header;
use deadcap_staging::DatasetKind;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters from one merge run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Whether the dead money export existed
    pub source_found: bool,

    pub rows_read: usize,

    /// Rows missing a name, team or year
    pub skipped: usize,

    pub matched: usize,

    pub unmatched: usize,

    /// Fact rows after the merge
    pub contracts: usize,

    /// Mart rows after recomputation, zero when nothing was written
    pub impact_rows: usize,
}

/// Files written by a mart recomputation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MartFiles {
    pub cap_impact: WrittenFile,
    pub team_dead_money: WrittenFile,
}

/// Sum every component into its category bucket, one row per
/// `(player_id, team, year)`, ordered by that key.
///
/// `cap_hit_millions` is the sum of the buckets, so the five subtotals always
/// reconcile to it.
pub fn recompute_cap_impact(components: &[ContractComponent]) -> Vec<PlayerCapImpact> {
    let mut groups: BTreeMap<ImpactKey, PlayerCapImpact> = BTreeMap::new();

    for component in components {
        let key = component.impact_key();
        let row = groups.entry(key).or_insert_with_key(|key| PlayerCapImpact {
            impact_id: key.impact_id(),
            player_id: key.player_id.clone(),
            team: key.team.clone(),
            year: key.year,
            cap_hit_millions: 0.0,
            dead_money_millions: 0.0,
            salary_millions: 0.0,
            signing_bonus_millions: 0.0,
            roster_bonus_millions: 0.0,
            other_millions: 0.0,
        });

        let amount = component.amount_millions;
        match component.salary_type {
            SalaryType::DeadCap => row.dead_money_millions += amount,
            SalaryType::BaseSalary => row.salary_millions += amount,
            SalaryType::SigningBonus => row.signing_bonus_millions += amount,
            SalaryType::RosterBonus => row.roster_bonus_millions += amount,
            SalaryType::Other => row.other_millions += amount,
        }
    }

    groups
        .into_values()
        .map(|mut row| {
            row.cap_hit_millions = row.bucket_total();
            row
        })
        .collect()
}

/// Dead money per `(year, team)`, ordered by year then team
pub fn team_dead_money_rollup(impacts: &[PlayerCapImpact]) -> Vec<TeamDeadMoney> {
    let mut totals: BTreeMap<(i32, &str), f64> = BTreeMap::new();
    for impact in impacts {
        *totals.entry((impact.year, impact.team.as_str())).or_default() += impact.dead_money_millions;
    }

    totals
        .into_iter()
        .map(|((year, team), dead_money_millions)| TeamDeadMoney {
            year,
            team: team.to_string(),
            dead_money_millions,
        })
        .collect()
}

/// Recompute both marts from `contracts` and write them
pub fn write_marts(store: &ProcessedStore, contracts: &[ContractComponent]) -> Result<MartFiles> {
    let impacts = recompute_cap_impact(contracts);
    let cap_impact = store.save_cap_impact(&impacts)?;
    let team_dead_money = store.save_team_dead_money(&team_dead_money_rollup(&impacts))?;

    info!(
        impact_rows = cap_impact.rows,
        team_rows = team_dead_money.rows,
        "marts recomputed"
    );
    Ok(MartFiles {
        cap_impact,
        team_dead_money,
    })
}

/// A dead money component ready to merge
#[derive(Debug, Clone, PartialEq)]
struct DeadMoneyRow {
    player_name: String,
    team: String,
    year: i32,
    amount: f64,
}

/// Read an external dead money export. Rows without a name, team or year are
/// counted and dropped.
fn read_dead_money_rows(path: &Path) -> Result<(Vec<DeadMoneyRow>, usize, usize)> {
    let mut table = Table::read(path)?;
    table.rename_headers(|h| DatasetKind::DeadMoney.canonical_column(&clean_header(h)));

    let mut rows = Vec::new();
    let mut skipped = 0;
    for i in 0..table.len() {
        let player_name = table.get(i, "player_name").unwrap_or_default().trim();
        let team = table.get(i, "team").unwrap_or_default().trim();
        let year = table.get(i, "year").and_then(parse_year).unwrap_or(0);

        if player_name.is_empty() || team.is_empty() || year == 0 {
            debug!(row = i + 1, "incomplete dead money row skipped");
            skipped += 1;
            continue;
        }

        rows.push(DeadMoneyRow {
            player_name: player_name.to_string(),
            team: team.to_uppercase(),
            year,
            amount: table.get(i, "dead_cap_millions").map(parse_money).unwrap_or(0.0),
        });
    }

    Ok((rows, table.len(), skipped))
}

/// Contract fact maintenance for one run
pub struct CapImpactAggregator {
    store: ProcessedStore,
    name_prefix_len: usize,
}

impl CapImpactAggregator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            store: ProcessedStore::new(config),
            name_prefix_len: config.merge.name_prefix_len,
        }
    }

    pub fn store(&self) -> &ProcessedStore {
        &self.store
    }

    /// Merge `dead_money_csv` using the name-prefix heuristic
    pub fn merge_dead_money(&self, dead_money_csv: &Path) -> Result<MergeSummary> {
        self.merge_dead_money_with(dead_money_csv, |players| {
            Box::new(PrefixHeuristicResolver::new(players, self.name_prefix_len))
        })
    }

    /// Merge `dead_money_csv` with a caller-chosen resolver.
    ///
    /// The base tables are loaded first, so an unseeded processed directory
    /// fails with `MissingBaseTable` even when the export is absent. A missing
    /// export, an export with no rows, or one where nothing matched leaves
    /// every processed file untouched.
    ///
    /// Each matched row becomes its own `dead_cap` component keyed
    /// `<player_id>_dead_money_<n>`, where `n` counts that player's matched
    /// rows in file order. Distinct rows for one player are summed by the
    /// mart, and merging the same export twice does not double count.
    pub fn merge_dead_money_with<F>(&self, dead_money_csv: &Path, make_resolver: F) -> Result<MergeSummary>
    where
        F: FnOnce(&[deadcap_core::Player]) -> Box<dyn IdentityResolver>,
    {
        let mut summary = MergeSummary::default();

        let players = self.store.load_players()?;
        let contracts = self.store.load_contracts()?;
        summary.contracts = contracts.len();

        if !dead_money_csv.exists() {
            warn!(path = %dead_money_csv.display(), "dead money export not found; nothing merged");
            return Ok(summary);
        }
        summary.source_found = true;

        let (rows, rows_read, skipped) = read_dead_money_rows(dead_money_csv)?;
        summary.rows_read = rows_read;
        summary.skipped = skipped;
        if rows.is_empty() {
            warn!(path = %dead_money_csv.display(), "dead money export has no usable rows; nothing merged");
            return Ok(summary);
        }

        let resolver = make_resolver(&players);
        let mut ordinals: HashMap<String, usize> = HashMap::new();
        let mut log = UpsertLog::from_records(contracts);
        for row in rows {
            let query = LinkQuery::new(&row.player_name, Some(&row.team), Some(row.year));
            let Some(player_id) = resolver.resolve(&query) else {
                debug!(
                    player = %row.player_name,
                    team = %row.team,
                    year = row.year,
                    resolver = resolver.name(),
                    "no dimension match"
                );
                summary.unmatched += 1;
                continue;
            };

            let ordinal = ordinals.entry(player_id.clone()).or_default();
            *ordinal += 1;

            let team = crate::linker::player_id_team_year(&player_id)
                .map(|(team, _)| team.to_string())
                .unwrap_or(row.team);
            log.upsert(ContractComponent {
                contract_id: format!("{}_dead_money_{}", player_id, ordinal),
                player_id,
                team,
                year: row.year,
                salary_type: SalaryType::DeadCap,
                amount_millions: row.amount,
                designation: None,
                status: ContractStatus::Active,
            });
            summary.matched += 1;
        }

        info!(matched = summary.matched, unmatched = summary.unmatched, "dead money matched");
        if summary.matched == 0 {
            return Ok(summary);
        }

        let contracts = log.into_records();
        self.store.save_contracts(&contracts)?;
        let marts = write_marts(&self.store, &contracts)?;

        summary.contracts = contracts.len();
        summary.impact_rows = marts.cap_impact.rows;
        Ok(summary)
    }

    /// Recompute the marts from the current fact table without merging
    pub fn recompute(&self) -> Result<MartFiles> {
        let contracts = self.store.load_contracts()?;
        write_marts(&self.store, &contracts)
    }
}
