//! Staging layer for raw salary-cap exports
//!
//! This crate handles:
//! - Dataset kinds, file naming and header alias maps
//! - Raw → staging normalization with permissive money/year coercion
//! - Latest team cap snapshot discovery

pub mod dataset;
pub mod stage;

pub use dataset::DatasetKind;
pub use stage::{normalize_table, StageOutcome, StagingNormalizer};
