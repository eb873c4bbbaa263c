//! Pipeline error taxonomy
//!
//! Only structural problems surface here. Row-level and value-level problems
//! (unparseable money, unmatched players, absent year files) are absorbed by
//! the component that meets them and never become a `PipelineError`.

use std::path::{Path, PathBuf};

/// Result alias used across the pipeline crates
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Errors that propagate to the orchestrator
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A processed base table (dimension or fact) is absent.
    ///
    /// Raised when a merge runs before the tables were seeded, so callers can
    /// tell "first run" apart from a corrupted processed directory.
    #[error("missing base table '{table}' at {path}; run roster seeding first")]
    MissingBaseTable { table: String, path: PathBuf },

    /// One or more staging invariants failed; every issue found is listed.
    #[error("staging validation failed:\n{}", .issues.join("\n"))]
    StagingValidation { issues: Vec<String> },
}

impl PipelineError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn missing_base_table(table: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::MissingBaseTable {
            table: table.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Whether the orchestrator should halt rather than continue to the next step
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingBaseTable { .. } | Self::StagingValidation { .. }
        )
    }
}
