use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deadcap_core::{PipelineConfig, PipelineError, RunReport, Severity};
use deadcap_engine::dead_money::write_linked;
use deadcap_engine::{
    link_dead_money_to_roster, seed_from_roster, CapImpactAggregator, EntityLinker,
    NormalizeOutcome, Reconciler, StagingValidator,
};
use deadcap_staging::{StageOutcome, StagingNormalizer};

/// deadcap - NFL salary cap and dead money pipeline
#[derive(Parser)]
#[command(name = "deadcap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: $DEADCAP_CONFIG or deadcap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage raw exports for one year
    Stage {
        /// Season to stage (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Team cap snapshot date (default: latest on disk)
        #[arg(short, long)]
        snapshot: Option<String>,
    },

    /// Validate every staged file
    Validate {
        /// Output file for report.json
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Normalize staged files for one year into the processed directory
    Normalize {
        /// Season to normalize (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Merge a dead money export into the contract fact table
    Merge {
        /// Dead money CSV (default: merge.dead_money_csv from config)
        #[arg(short, long)]
        dead_money: Option<PathBuf>,
    },

    /// Seed the player dimension and base contracts from a roster export
    Seed {
        /// Roster CSV
        roster: PathBuf,
    },

    /// Link a dead money export to a roster and write team totals
    Link {
        /// Dead money CSV
        dead_money: PathBuf,

        /// Roster CSV
        roster: PathBuf,
    },

    /// Reconcile processed tables (warnings only)
    Reconcile {
        /// Output file for report.json
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Stage, validate, normalize and merge one year
    Run {
        /// Season to process (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Team cap snapshot date (default: latest on disk)
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Output file for the validation report.json
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Write a config file with every default filled in
    Init {
        /// Destination (default: deadcap.toml)
        #[arg(default_value = "deadcap.toml")]
        path: PathBuf,
    },
}

fn main() {
    // .env may set RUST_LOG and DEADCAP_CONFIG
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        if let Some(PipelineError::StagingValidation { issues }) = err.downcast_ref::<PipelineError>() {
            eprintln!("{} {} issue(s)", "Staging validation failed:".red().bold(), issues.len());
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { path } = &cli.command {
        return init_command(path);
    }

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Stage { year, snapshot } => {
            stage_command(&config, year_or_current(year), snapshot.as_deref())
        }
        Commands::Validate { report } => validate_command(&config, report.as_deref()),
        Commands::Normalize { year } => normalize_command(&config, year_or_current(year)),
        Commands::Merge { dead_money } => {
            let source = dead_money.unwrap_or_else(|| config.dead_money_csv_path());
            merge_command(&config, &source)
        }
        Commands::Seed { roster } => seed_command(&config, &roster),
        Commands::Link { dead_money, roster } => link_command(&config, &dead_money, &roster),
        Commands::Reconcile { report } => reconcile_command(&config, report.as_deref()),
        Commands::Run {
            year,
            snapshot,
            report,
        } => {
            let year = year_or_current(year);
            stage_command(&config, year, snapshot.as_deref())?;
            validate_command(&config, report.as_deref())?;
            normalize_command(&config, year)?;
            merge_command(&config, &config.dead_money_csv_path())
        }
        Commands::Init { .. } => Ok(()),
    }
}

fn load_config(explicit: Option<&Path>, verbose: bool) -> Result<PipelineConfig> {
    let from_env = std::env::var_os("DEADCAP_CONFIG").map(PathBuf::from);
    let path = explicit.map(Path::to_path_buf).or(from_env);

    let config = match path {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if Path::new("deadcap.toml").exists() => {
            PipelineConfig::from_file(Path::new("deadcap.toml"))?
        }
        None => {
            if verbose {
                eprintln!("{}", "No config file found, using defaults".yellow());
            }
            PipelineConfig::default()
        }
    };

    if verbose {
        eprintln!("{} {}", "Project root:".cyan(), config.project_root.display());
    }
    tracing::debug!(
        raw = %config.raw_path().display(),
        staging = %config.staging_path().display(),
        "resolved pipeline directories"
    );
    Ok(config)
}

fn year_or_current(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| chrono::Local::now().year())
}

fn init_command(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    PipelineConfig::default().save_to_file(path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

fn stage_command(config: &PipelineConfig, year: i32, snapshot: Option<&str>) -> Result<()> {
    let outcomes = StagingNormalizer::new(config).stage_all(year, snapshot)?;

    println!("{} {}", "Staging".bold(), year);
    for (kind, outcome) in outcomes {
        match outcome {
            StageOutcome::Staged(file) => println!(
                "  {} {:<16} {} ({} rows, sha256 {})",
                "✓".green(),
                kind.to_string(),
                file.path.display(),
                file.rows,
                &file.sha256[..12]
            ),
            StageOutcome::NotFound { path } => println!(
                "  {} {:<16} not found: {}",
                "-".yellow(),
                kind.to_string(),
                path.display()
            ),
            StageOutcome::Unreadable { path, reason } => println!(
                "  {} {:<16} unreadable: {} ({})",
                "!".yellow(),
                kind.to_string(),
                path.display(),
                reason
            ),
        }
    }
    Ok(())
}

fn validate_command(config: &PipelineConfig, report_path: Option<&Path>) -> Result<()> {
    let report = StagingValidator::new(config).inspect();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }
    print_report_summary(&report);

    if report.has_errors() {
        return Err(PipelineError::StagingValidation {
            issues: report.error_lines(),
        }
        .into());
    }
    Ok(())
}

fn normalize_command(config: &PipelineConfig, year: i32) -> Result<()> {
    let outcomes = EntityLinker::new(config).normalize_all(year)?;

    println!("{} {}", "Normalizing".bold(), year);
    for (kind, outcome) in outcomes {
        match outcome {
            NormalizeOutcome::Written { file, linked } => println!(
                "  {} {:<16} {} ({} rows, {} linked)",
                "✓".green(),
                kind.to_string(),
                file.path.display(),
                file.rows,
                linked
            ),
            NormalizeOutcome::MissingInput { path } => println!(
                "  {} {:<16} missing input: {}",
                "-".yellow(),
                kind.to_string(),
                path.display()
            ),
        }
    }
    Ok(())
}

fn merge_command(config: &PipelineConfig, source: &Path) -> Result<()> {
    let summary = CapImpactAggregator::new(config).merge_dead_money(source)?;

    if !summary.source_found {
        println!("{} {}", "Dead money export not found:".yellow(), source.display());
        return Ok(());
    }

    println!("{}", "Dead money merge".bold());
    println!("  Rows read:  {}", summary.rows_read);
    println!("  Skipped:    {}", summary.skipped);
    println!("  Matched:    {}", format!("{}", summary.matched).green());
    if summary.unmatched > 0 {
        println!("  Unmatched:  {}", format!("{}", summary.unmatched).yellow());
    } else {
        println!("  Unmatched:  {}", summary.unmatched);
    }
    println!("  Contracts:  {}", summary.contracts);
    println!("  Mart rows:  {}", summary.impact_rows);
    Ok(())
}

fn seed_command(config: &PipelineConfig, roster: &Path) -> Result<()> {
    let summary = seed_from_roster(config, roster)?;

    if !summary.roster_found {
        println!("{} {}", "Roster not found:".yellow(), roster.display());
        return Ok(());
    }

    println!("{}", "Roster seeding".bold());
    println!("  Roster rows: {}", summary.roster_rows);
    println!("  Skipped:     {}", summary.skipped);
    println!("  Players:     {}", summary.players);
    println!("  Contracts:   {}", summary.contracts);
    Ok(())
}

fn link_command(config: &PipelineConfig, dead_money: &Path, roster: &Path) -> Result<()> {
    let records = link_dead_money_to_roster(dead_money, roster)?;
    let (players, teams) = write_linked(&config.processed_path(), &records)?;
    let matched = records.iter().filter(|r| r.matched).count();

    println!("{}", "Dead money roster linkage".bold());
    println!("  Records: {} ({} matched)", records.len(), matched);
    println!("  {} {}", "✓".green(), players.path.display());
    println!("  {} {} ({} team-years)", "✓".green(), teams.path.display(), teams.rows);
    Ok(())
}

fn reconcile_command(config: &PipelineConfig, report_path: Option<&Path>) -> Result<()> {
    let report = Reconciler::new(config).run();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }
    print_report_summary(&report);
    Ok(())
}

fn print_report_summary(report: &RunReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{} {}", "deadcap".bold().bright_blue(), report.step.as_str().bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!("Files checked: {}", report.summary.files_checked);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
        return;
    }

    println!("{}", "Diagnostics:".bold());
    for diag in &report.diagnostics {
        let severity_str = match diag.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };

        println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

        if let Some(loc) = &diag.location {
            match loc.row {
                Some(row) => println!("    at {}, row {}", loc.file, row),
                None => println!("    at {}", loc.file),
            }
        }

        if let Some(exp) = &diag.expected {
            println!("    Expected: {}", exp);
        }
        if let Some(act) = &diag.actual {
            println!("    Actual:   {}", act);
        }
    }
}
