//! Dimensional model for players, contract components and cap-impact marts
//!
//! Column names and orders here are the CSV contract with the dbt layer.
//! Do not rename fields without updating the dbt sources.

use serde::{Deserialize, Serialize};

/// Player dimension row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable synthetic key, see [`synthetic_player_id`]
    pub player_id: String,

    pub player_name: String,

    pub position: String,

    #[serde(default)]
    pub nfl_years: Option<u32>,

    #[serde(default)]
    pub college: Option<String>,

    #[serde(default)]
    pub draft_year: Option<i32>,
}

impl Player {
    /// Create a player with only the required fields
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            position: position.into(),
            nfl_years: None,
            college: None,
            draft_year: None,
        }
    }
}

/// Build the synthetic player key `PFR_<NAME>_<TEAM>_<YEAR>`.
///
/// `<NAME>` is the uppercased name with everything except `A-Z0-9` removed.
pub fn synthetic_player_id(player_name: &str, team: &str, year: i32) -> String {
    let name: String = player_name
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    format!("PFR_{}_{}_{}", name, team, year)
}

/// Category tag of a contract component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    #[serde(alias = "salary")]
    BaseSalary,

    SigningBonus,

    #[serde(alias = "dead_money")]
    DeadCap,

    RosterBonus,

    /// Anything not recognized above
    #[serde(other)]
    Other,
}

impl SalaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseSalary => "base_salary",
            Self::SigningBonus => "signing_bonus",
            Self::DeadCap => "dead_cap",
            Self::RosterBonus => "roster_bonus",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for SalaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction designation attached to a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Designation {
    #[serde(alias = "pre_june_1")]
    PreJune1,

    #[serde(alias = "post_june_1")]
    PostJune1,

    VoidYear,

    Trade,
}

/// Lifecycle status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Voided,

    Cut,

    Released,

    /// Unrecognized or blank statuses read as active
    #[default]
    #[serde(other)]
    Active,
}

/// One additive contract component (fact row)
///
/// Several components may share a `(player_id, team, year)` key. They are
/// never merged; the mart sums them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractComponent {
    pub contract_id: String,

    pub player_id: String,

    pub team: String,

    pub year: i32,

    pub salary_type: SalaryType,

    /// May be negative; parenthesized source amounts are preserved as such
    pub amount_millions: f64,

    #[serde(default, deserialize_with = "crate::serde_helpers::lenient_option")]
    pub designation: Option<Designation>,

    #[serde(default)]
    pub status: ContractStatus,
}

impl ContractComponent {
    /// Grouping key used by the cap-impact mart
    pub fn impact_key(&self) -> ImpactKey {
        ImpactKey {
            player_id: self.player_id.clone(),
            team: self.team.clone(),
            year: self.year,
        }
    }
}

/// `(player_id, team, year)` grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImpactKey {
    pub player_id: String,
    pub team: String,
    pub year: i32,
}

impl ImpactKey {
    /// Deterministic mart identifier for this key
    pub fn impact_id(&self) -> String {
        format!("{}_{}_{}", self.player_id, self.team, self.year)
    }
}

/// Cap-impact mart row, one per player x team x year
///
/// `cap_hit_millions` is the sum of the five buckets by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCapImpact {
    pub impact_id: String,
    pub player_id: String,
    pub team: String,
    pub year: i32,
    pub cap_hit_millions: f64,
    pub dead_money_millions: f64,
    pub salary_millions: f64,
    pub signing_bonus_millions: f64,
    pub roster_bonus_millions: f64,
    pub other_millions: f64,
}

impl PlayerCapImpact {
    /// Sum of the categorized buckets plus the residual
    pub fn bucket_total(&self) -> f64 {
        self.salary_millions
            + self.signing_bonus_millions
            + self.roster_bonus_millions
            + self.dead_money_millions
            + self.other_millions
    }
}

/// Team dead money rollup row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDeadMoney {
    pub year: i32,
    pub team: String,
    pub dead_money_millions: f64,
}

/// Team cap snapshot as staged from a team cap export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamCapSnapshot {
    pub team_name: String,
    pub year: Option<i32>,
    pub active_cap_millions: f64,
    pub dead_money_millions: f64,
    pub salary_cap_millions: f64,
    pub cap_space_millions: f64,
    pub dead_cap_pct: f64,
}

/// Dead money as a percentage of the salary cap; zero when the cap is zero
pub fn dead_cap_pct(dead_money_millions: f64, salary_cap_millions: f64) -> f64 {
    if salary_cap_millions == 0.0 {
        0.0
    } else {
        dead_money_millions / salary_cap_millions * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_ids() {
        assert_eq!(synthetic_player_id("Tom Brady", "TB", 2019), "PFR_TOMBRADY_TB_2019");
        assert_eq!(
            synthetic_player_id("Ja'Marr Chase", "CIN", 2023),
            "PFR_JAMARRCHASE_CIN_2023"
        );
    }

    #[test]
    fn impact_id_includes_team_and_year() {
        let key = ImpactKey {
            player_id: "PFR_X_TAM_2020".to_string(),
            team: "TAM".to_string(),
            year: 2020,
        };
        assert_eq!(key.impact_id(), "PFR_X_TAM_2020_TAM_2020");
    }

    #[test]
    fn dead_cap_pct_handles_zero_cap() {
        assert_eq!(dead_cap_pct(10.0, 0.0), 0.0);
        assert!((dead_cap_pct(20.0, 200.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn salary_type_labels() {
        assert_eq!(SalaryType::DeadCap.to_string(), "dead_cap");
        assert_eq!(SalaryType::BaseSalary.as_str(), "base_salary");
    }

    #[test]
    fn unknown_status_reads_as_active() {
        let cut: ContractStatus = serde_json::from_str("\"cut\"").unwrap();
        let unknown: ContractStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(cut, ContractStatus::Cut);
        assert_eq!(unknown, ContractStatus::Active);
        assert_eq!(serde_json::to_string(&ContractStatus::default()).unwrap(), "\"active\"");
    }
}
