use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use singlescope::analysis::Severity;
use singlescope::export::{self, ExportFormat};
use singlescope::resolve::DEFAULT_MAX_DEPTH;
use singlescope::scan::{scan, ScanConfig, DEFAULT_PACKAGE};
use singlescope::workspace::StoreLayout;

/// Exit code used when `--fail-on` is met.
const EXIT_THRESHOLD: u8 = 2;

#[derive(Parser)]
#[command(name = "singlescope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Detects workspaces bound to more than one installed copy of a singleton npm dependency", long_about = None)]
struct Cli {
    /// Root directory to scan
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Also write the JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Package that must be installed exactly once
    #[arg(short, long, env = "SINGLESCOPE_PACKAGE", default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Workspace area to scan (repeatable; defaults to the root manifest's
    /// workspaces, else apps and packages)
    #[arg(short = 'w', long = "workspace", value_name = "AREA")]
    workspaces: Vec<String>,

    /// Maximum number of parent directories to walk when resolving
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Export condition to accept when reading `exports` (repeatable;
    /// defaults to node, require, import and default)
    #[arg(short = 'c', long = "condition", value_name = "CONDITION")]
    conditions: Vec<String>,

    /// Package store directory, relative to the root
    #[arg(long, default_value = "node_modules/.pnpm")]
    store_dir: PathBuf,

    /// Store entry prefix; {name} is replaced by the package name
    #[arg(long, default_value = "{name}@")]
    store_prefix: String,

    /// Skip the direct sweep of the package store
    #[arg(long)]
    no_store_sweep: bool,

    /// Output format for stdout (json, markdown)
    #[arg(short, long, default_value = "json")]
    format: ExportFormat,

    /// Do not print the report to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Exit with status 2 when the severity reaches this level
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    fail_on: FailOn,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FailOn {
    Never,
    Warning,
    Error,
}

impl FailOn {
    fn threshold(self) -> Option<Severity> {
        match self {
            FailOn::Never => None,
            FailOn::Warning => Some(Severity::Warning),
            FailOn::Error => Some(Severity::Error),
        }
    }
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        let store = (!self.no_store_sweep).then(|| StoreLayout {
            dir: self.store_dir.clone(),
            entry_prefix: self.store_prefix.clone(),
            ..StoreLayout::default()
        });

        ScanConfig {
            root: self.dir.clone(),
            package: self.package.clone(),
            areas: (!self.workspaces.is_empty()).then(|| self.workspaces.clone()),
            max_depth: self.max_depth,
            conditions: (!self.conditions.is_empty()).then(|| self.conditions.clone()),
            store,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let outcome = scan(&cli.scan_config())?;
    let report = &outcome.report;

    if let Some(path) = &cli.report {
        export::write_report_file(path, report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "wrote report");
    }

    if !cli.quiet {
        let mut stdout = io::stdout().lock();
        export::export(cli.format, report, &mut stdout).context("failed to print report")?;
    }

    info!(
        scanned = report.scanned_files,
        flagged = report.flagged_files,
        severity = %report.severity,
        "scan complete"
    );

    match cli.fail_on.threshold() {
        Some(threshold) if report.severity >= threshold => Ok(ExitCode::from(EXIT_THRESHOLD)),
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
