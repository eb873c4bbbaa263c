//! Processed table store
//!
//! The processed directory holds the player dimension, the contract fact
//! table and the two marts. Column orders below are the dbt seed contract.

use deadcap_core::table::{read_records, write_records};
use deadcap_core::{
    ContractComponent, PipelineConfig, PipelineError, Player, PlayerCapImpact, Result,
    TeamDeadMoney, WrittenFile,
};
use std::path::{Path, PathBuf};

pub const DIM_PLAYERS: &str = "dim_players.csv";
pub const FACT_CONTRACTS: &str = "fact_player_contracts.csv";
pub const MART_CAP_IMPACT: &str = "mart_player_cap_impact.csv";
pub const TEAM_DEAD_MONEY: &str = "team_dead_money_by_year.csv";

pub const PLAYER_COLUMNS: &[&str] = &[
    "player_id",
    "player_name",
    "position",
    "nfl_years",
    "college",
    "draft_year",
];

pub const CONTRACT_COLUMNS: &[&str] = &[
    "contract_id",
    "player_id",
    "team",
    "year",
    "salary_type",
    "amount_millions",
    "designation",
    "status",
];

pub const CAP_IMPACT_COLUMNS: &[&str] = &[
    "impact_id",
    "player_id",
    "team",
    "year",
    "cap_hit_millions",
    "dead_money_millions",
    "salary_millions",
    "signing_bonus_millions",
    "roster_bonus_millions",
    "other_millions",
];

pub const TEAM_DEAD_MONEY_COLUMNS: &[&str] = &["year", "team", "dead_money_millions"];

/// Handle on the processed directory for one run
#[derive(Debug, Clone)]
pub struct ProcessedStore {
    dir: PathBuf,
}

impl ProcessedStore {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::at(config.processed_path())
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Player dimension; a missing file is a [`PipelineError::MissingBaseTable`]
    pub fn load_players(&self) -> Result<Vec<Player>> {
        self.load_base("players", DIM_PLAYERS)
    }

    /// Contract fact table; a missing file is a [`PipelineError::MissingBaseTable`]
    pub fn load_contracts(&self) -> Result<Vec<ContractComponent>> {
        self.load_base("contracts", FACT_CONTRACTS)
    }

    /// Player dimension, or `None` before the first seeding run
    pub fn try_load_players(&self) -> Result<Option<Vec<Player>>> {
        self.load_optional(DIM_PLAYERS)
    }

    /// Contract fact table, or `None` before the first seeding run
    pub fn try_load_contracts(&self) -> Result<Option<Vec<ContractComponent>>> {
        self.load_optional(FACT_CONTRACTS)
    }

    pub fn try_load_team_dead_money(&self) -> Result<Option<Vec<TeamDeadMoney>>> {
        self.load_optional(TEAM_DEAD_MONEY)
    }

    pub fn save_players(&self, players: &[Player]) -> Result<WrittenFile> {
        write_records(&self.path(DIM_PLAYERS), PLAYER_COLUMNS, players)
    }

    pub fn save_contracts(&self, contracts: &[ContractComponent]) -> Result<WrittenFile> {
        write_records(&self.path(FACT_CONTRACTS), CONTRACT_COLUMNS, contracts)
    }

    pub fn save_cap_impact(&self, rows: &[PlayerCapImpact]) -> Result<WrittenFile> {
        write_records(&self.path(MART_CAP_IMPACT), CAP_IMPACT_COLUMNS, rows)
    }

    pub fn save_team_dead_money(&self, rows: &[TeamDeadMoney]) -> Result<WrittenFile> {
        write_records(&self.path(TEAM_DEAD_MONEY), TEAM_DEAD_MONEY_COLUMNS, rows)
    }

    fn load_base<T: serde::de::DeserializeOwned>(&self, table: &str, file: &str) -> Result<Vec<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Err(PipelineError::missing_base_table(table, path));
        }
        read_records(&path)
    }

    fn load_optional<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Option<Vec<T>>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        read_records(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadcap_core::{ContractStatus, Designation, SalaryType};
    use pretty_assertions::assert_eq;

    fn component(contract_id: &str, amount: f64) -> ContractComponent {
        ContractComponent {
            contract_id: contract_id.to_string(),
            player_id: "PFR_TOMBRADY_TB_2019".to_string(),
            team: "TB".to_string(),
            year: 2019,
            salary_type: SalaryType::DeadCap,
            amount_millions: amount,
            designation: None,
            status: ContractStatus::Active,
        }
    }

    #[test]
    fn missing_base_tables_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::at(dir.path());

        let err = store.load_players().unwrap_err();
        assert!(matches!(err, PipelineError::MissingBaseTable { ref table, .. } if table == "players"));

        let err = store.load_contracts().unwrap_err();
        assert!(matches!(err, PipelineError::MissingBaseTable { ref table, .. } if table == "contracts"));

        assert!(store.try_load_players().unwrap().is_none());
    }

    #[test]
    fn contracts_keep_header_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::at(dir.path());

        let mut traded = component("c2", -1.25);
        traded.designation = Some(Designation::Trade);
        store.save_contracts(&[component("c1", 3.5), traded]).unwrap();

        let text = std::fs::read_to_string(store.path(FACT_CONTRACTS)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CONTRACT_COLUMNS.join(",").as_str()));
        assert_eq!(lines.next(), Some("c1,PFR_TOMBRADY_TB_2019,TB,2019,dead_cap,3.5,,active"));

        let loaded = store.load_contracts().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].amount_millions, -1.25);
        assert_eq!(loaded[1].designation, Some(Designation::Trade));
    }

    #[test]
    fn players_with_blank_optionals_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedStore::at(dir.path());
        store
            .save_players(&[Player::new("PFR_A_DAL_2020", "A", "QB")])
            .unwrap();

        let players = store.load_players().unwrap();
        assert_eq!(players, vec![Player::new("PFR_A_DAL_2020", "A", "QB")]);
    }
}
