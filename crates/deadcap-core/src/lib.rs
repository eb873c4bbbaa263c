//! deadcap core
//!
//! Shared model, configuration and I/O for the salary-cap pipeline.
//! Issue codes and CSV column sets are part of the public contract.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod model;
pub mod money;
pub mod names;
pub mod report;
pub mod serde_helpers;
pub mod table;
pub mod upsert;

pub use config::{ConfigError, LinkStrategy, PipelineConfig};
pub use diagnostic::{Diagnostic, IssueCode, Location, Severity};
pub use error::{PipelineError, Result};
pub use model::{
    ContractComponent, ContractStatus, Designation, ImpactKey, Player, PlayerCapImpact,
    SalaryType, TeamCapSnapshot, TeamDeadMoney,
};
pub use money::{format_amount, parse_money, parse_year};
pub use names::{normalize_name, normalize_team};
pub use report::{ReportSummary, ReportVersion, RunReport};
pub use table::{Table, WrittenFile};
pub use upsert::{Keyed, UpsertLog};
