//! deadcap engine - linking, aggregation and validation
//!
//! This crate implements:
//! - Entity linking of staged rows to the player dimension
//! - Dead money merge and full cap-impact mart recomputation
//! - Staging validation and reconciliation checks
//! - Roster seeding of the processed base tables

pub mod aggregator;
pub mod dead_money;
pub mod linker;
pub mod reconcile;
pub mod roster;
pub mod seed;
pub mod store;
pub mod validator;

pub use aggregator::{
    recompute_cap_impact, team_dead_money_rollup, CapImpactAggregator, MartFiles, MergeSummary,
};
pub use dead_money::{link_dead_money_to_roster, team_dead_money_totals, DeadMoneyRecord};
pub use linker::{
    resolver_for, EntityLinker, ExactNameResolver, IdentityResolver, LinkQuery,
    NameTeamYearResolver, NormalizeOutcome, PrefixHeuristicResolver,
};
pub use reconcile::{find_duplicate_components, reconcile_team_totals, Reconciler};
pub use seed::{seed_from_roster, SeedSummary};
pub use store::ProcessedStore;
pub use validator::StagingValidator;
