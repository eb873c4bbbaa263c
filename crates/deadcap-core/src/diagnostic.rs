//! Issue codes and structured findings
//!
//! IMPORTANT: Issue codes are consumed by alerting on the orchestrator side.
//! NEVER rename or remove codes - add new ones instead.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Issue code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Staging checks
    /// Team cap snapshot covers fewer teams than the configured minimum
    StagingLowTeamCount,

    /// A staged row has no year
    StagingNullYear,

    /// Required columns are absent from a staged file
    StagingMissingColumns,

    /// A staged dead money amount is negative
    StagingNegativeDeadMoney,

    /// A staged file could not be read as CSV
    StagingUnreadable,

    // Reconciliation checks
    /// Player-level dead money does not add up to the team-level figure
    ReconcileTeamTotalMismatch,

    /// The same player/team/year/category appears more than once
    ReconcileDuplicateComponent,

    /// A table needed for reconciliation could not be read
    ReconcileUnreadable,
}

impl IssueCode {
    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StagingLowTeamCount => "STAGING_LOW_TEAM_COUNT",
            Self::StagingNullYear => "STAGING_NULL_YEAR",
            Self::StagingMissingColumns => "STAGING_MISSING_COLUMNS",
            Self::StagingNegativeDeadMoney => "STAGING_NEGATIVE_DEAD_MONEY",
            Self::StagingUnreadable => "STAGING_UNREADABLE",
            Self::ReconcileTeamTotalMismatch => "RECONCILE_TEAM_TOTAL_MISMATCH",
            Self::ReconcileDuplicateComponent => "RECONCILE_DUPLICATE_COMPONENT",
            Self::ReconcileUnreadable => "RECONCILE_UNREADABLE",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Worth reviewing, never fails a run
    Warn,

    /// Halts the pipeline
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a finding was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File the finding refers to
    pub file: String,

    /// Optional 1-indexed data row
    pub row: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            row: None,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.display().to_string())
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// A finding with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable issue code
    pub code: IssueCode,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub location: Option<Location>,

    /// Expected value (for comparison findings)
    pub expected: Option<String>,

    /// Actual value (for comparison findings)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
        }
    }

    /// Shorthand for an error-level finding
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Shorthand for a warning-level finding
    pub fn warn(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warn, message)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// One-line rendering used in aggregated error messages
    pub fn to_issue_line(&self) -> String {
        format!("{}: {}", self.code, self.message)
    }
}
