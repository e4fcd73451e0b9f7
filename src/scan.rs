//! One end-to-end scan: walk, resolve, read versions, analyze, report.
//!
//! Consumers are resolved one after another with a single [`ResolveCache`]
//! that lives exactly as long as the scan. Output depends only on the
//! filesystem, so repeated scans of an unchanged tree are identical.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::analysis::{analyze, Analysis, ResolutionRecord};
use crate::report::Report;
use crate::resolve::{version_of, ResolutionFailure, ResolveCache, Resolver, DEFAULT_MAX_DEPTH};
use crate::workspace::{enumerate_consumers, workspace_areas, Consumer, StoreLayout};

/// Package checked when none is configured.
pub const DEFAULT_PACKAGE: &str = "yjs";

/// Settings for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Workspace root.
    pub root: PathBuf,
    /// The package that must be installed once.
    pub package: String,
    /// Workspace areas; `None` reads them from the root manifest.
    pub areas: Option<Vec<String>>,
    /// Bound on every upward directory walk.
    pub max_depth: usize,
    /// Export conditions to accept; `None` uses
    /// [`DEFAULT_CONDITIONS`](crate::resolve::DEFAULT_CONDITIONS).
    pub conditions: Option<Vec<String>>,
    /// Store convention for the direct sweep; `None` disables it.
    pub store: Option<StoreLayout>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            package: DEFAULT_PACKAGE.to_string(),
            areas: None,
            max_depth: DEFAULT_MAX_DEPTH,
            conditions: None,
            store: Some(StoreLayout::default()),
        }
    }
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Everything a scan produced, for callers that want more than the report.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Canonical workspace root.
    pub root: PathBuf,
    pub consumers: Vec<Consumer>,
    pub records: Vec<ResolutionRecord>,
    pub analysis: Analysis,
    pub report: Report,
}

/// Runs a scan.
///
/// Fails only when the root cannot be accessed or a workspace area cannot
/// be listed. Per-consumer problems end up as null fields in the report.
pub fn scan(config: &ScanConfig) -> Result<ScanOutcome> {
    let root = config
        .root
        .canonicalize()
        .with_context(|| format!("cannot access workspace root {}", config.root.display()))?;
    let areas = config
        .areas
        .clone()
        .unwrap_or_else(|| workspace_areas(&root));

    info!(
        root = %root.display(),
        package = %config.package,
        areas = ?areas,
        "scanning workspace"
    );

    let consumers = enumerate_consumers(&root, &areas, &config.package, config.store.as_ref())
        .context("failed to enumerate workspace consumers")?;

    let resolver = match &config.conditions {
        Some(conditions) => Resolver::new(config.max_depth).with_conditions(conditions),
        None => Resolver::new(config.max_depth),
    };
    let mut cache = ResolveCache::new();
    let records: Vec<ResolutionRecord> = consumers
        .iter()
        .enumerate()
        .map(|(index, consumer)| {
            resolve_consumer(&resolver, &mut cache, &config.package, index, consumer)
        })
        .collect();
    debug!(
        resolved_packages = cache.len(),
        cache_hits = cache.hits(),
        "resolution finished"
    );

    let analysis = analyze(&records);
    if analysis.is_duplicated() {
        warn!(
            package = %config.package,
            copies = analysis.groups.len(),
            severity = %analysis.severity,
            "workspace is bound to more than one copy"
        );
    }

    let report = Report::build(&consumers, &records, &analysis);
    Ok(ScanOutcome {
        root,
        consumers,
        records,
        analysis,
        report,
    })
}

fn resolve_consumer(
    resolver: &Resolver,
    cache: &mut ResolveCache,
    package: &str,
    index: usize,
    consumer: &Consumer,
) -> ResolutionRecord {
    let result = if consumer.is_store_copy() {
        resolver.resolve_package_dir(cache, &consumer.path)
    } else {
        resolver.resolve(cache, &consumer.path, package)
    };

    match result {
        Ok(real_path) => {
            let version = version_of(&real_path, resolver.max_depth());
            debug!(
                consumer = %consumer,
                resolved = %real_path.display(),
                version = version.as_deref().unwrap_or("unknown"),
                "resolved"
            );
            ResolutionRecord::resolved(index, real_path, version)
        }
        Err(failure) => {
            log_failure(&consumer.path, &failure);
            ResolutionRecord::failed(index, failure)
        }
    }
}

fn log_failure(consumer: &Path, failure: &ResolutionFailure) {
    match failure {
        ResolutionFailure::NotInstalled { .. } => {
            debug!(consumer = %consumer.display(), "{failure}");
        }
        ResolutionFailure::BrokenInstall { .. } => {
            warn!(consumer = %consumer.display(), kind = failure.kind(), "{failure}");
        }
    }
}
