//! Configuration schema (deadcap.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Join strategy used when linking staged rows to the player dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStrategy {
    /// Normalized name only (roster-style join)
    #[default]
    Name,

    /// Normalized name plus canonical team code and year (contract-style join)
    NameTeamYear,
}

/// Thresholds for the staging validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum distinct teams a team cap snapshot must cover
    #[serde(default = "default_min_teams")]
    pub min_distinct_teams: usize,

    /// Columns every player rankings staging file must carry
    #[serde(default = "default_ranking_columns")]
    pub required_ranking_columns: Vec<String>,
}

fn default_min_teams() -> usize {
    30
}

fn default_ranking_columns() -> Vec<String> {
    vec![
        "player_name".to_string(),
        "team".to_string(),
        "cap_total_millions".to_string(),
    ]
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_distinct_teams: default_min_teams(),
            required_ranking_columns: default_ranking_columns(),
        }
    }
}

/// Linking options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkingConfig {
    #[serde(default)]
    pub strategy: LinkStrategy,
}

/// Dead money merge options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// External dead money export merged into the contracts fact table
    #[serde(default = "default_dead_money_csv")]
    pub dead_money_csv: PathBuf,

    /// Leading characters of the player name used by the prefix matcher
    #[serde(default = "default_prefix_len")]
    pub name_prefix_len: usize,
}

fn default_dead_money_csv() -> PathBuf {
    PathBuf::from("data/raw/player_dead_money_sample.csv")
}

fn default_prefix_len() -> usize {
    5
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            dead_money_csv: default_dead_money_csv(),
            name_prefix_len: default_prefix_len(),
        }
    }
}

/// Reconciliation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Allowed gap between player-level and team-level dead money, in millions
    #[serde(default = "default_tolerance")]
    pub tolerance_millions: f64,
}

fn default_tolerance() -> f64 {
    0.1
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance_millions: default_tolerance(),
        }
    }
}

/// Main configuration structure
///
/// One instance is built per pipeline run and handed to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw collector output
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Staging layer output
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Processed dimension, fact and mart tables
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    #[serde(default)]
    pub validation: ValidationRules,

    #[serde(default)]
    pub linking: LinkingConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("data/staging")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed/compensation")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            staging_dir: default_staging_dir(),
            processed_dir: default_processed_dir(),
            validation: ValidationRules::default(),
            linking: LinkingConfig::default(),
            merge: MergeConfig::default(),
            reconcile: ReconcileConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted at `root`; handy for tests and ad-hoc runs
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Self::default()
        }
    }

    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.resolve(&self.raw_dir)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.resolve(&self.staging_dir)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.resolve(&self.processed_dir)
    }

    pub fn dead_money_csv_path(&self) -> PathBuf {
        self.resolve(&self.merge.dead_money_csv)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
