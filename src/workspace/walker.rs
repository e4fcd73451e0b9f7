//! Enumeration of the consumers whose binding to the target package is checked.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use super::store::StoreLayout;
use crate::parser::{package_name, read_manifest};

/// Workspace areas scanned when neither the caller nor the root manifest
/// names any.
pub const DEFAULT_AREAS: &[&str] = &["apps", "packages"];

/// Errors that abort the walk.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("workspace root {} does not exist or is not a directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("failed to list workspace area {}: {source}", path.display())]
    AreaUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result type for walker operations.
pub type WalkResult<T> = Result<T, WalkError>;

/// How a consumer was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    /// A member directory under one of the workspace areas.
    Workspace,
    /// An installed copy found by sweeping the package store directly.
    StoreCopy,
}

/// A package directory that is a candidate importer of the target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer {
    /// Absolute path of the package directory.
    pub path: PathBuf,
    /// Name declared in the directory's manifest, if any.
    pub name: Option<String>,
    pub kind: ConsumerKind,
}

impl Consumer {
    pub fn workspace(path: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            path: path.into(),
            name,
            kind: ConsumerKind::Workspace,
        }
    }

    pub fn store_copy(path: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            path: path.into(),
            name,
            kind: ConsumerKind::StoreCopy,
        }
    }

    /// Returns true for consumers synthesized by the store sweep.
    pub fn is_store_copy(&self) -> bool {
        self.kind == ConsumerKind::StoreCopy
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Returns the workspace areas declared by the root manifest.
///
/// Only single-level patterns of the form `<area>/*` are understood; other
/// patterns are ignored, as are repeats of an area already declared. Falls
/// back to [`DEFAULT_AREAS`] when nothing usable is declared.
pub fn workspace_areas(root: &Path) -> Vec<String> {
    let declared = match read_manifest(root) {
        Some(Ok(manifest)) => dedup_areas(
            manifest
                .workspace_patterns()
                .iter()
                .filter_map(|pattern| area_from_pattern(pattern)),
        ),
        _ => Vec::new(),
    };

    if declared.is_empty() {
        DEFAULT_AREAS.iter().map(|a| a.to_string()).collect()
    } else {
        declared
    }
}

fn area_from_pattern(pattern: &str) -> Option<String> {
    let area = pattern.strip_suffix("/*")?;
    let is_plain = !area.contains(['*', '?', '[', '{', '!']);
    is_plain.then(|| normalize_area(area)).filter(|a| !a.is_empty())
}

/// Spells an area the same way however it was written: `./packages/`,
/// `packages/` and `packages` are one area.
fn normalize_area(area: &str) -> String {
    let mut area = area.trim();
    while let Some(rest) = area.strip_prefix("./") {
        area = rest;
    }
    area.trim_end_matches('/').to_string()
}

/// Normalizes areas and drops repeats, keeping first-appearance order.
fn dedup_areas<I, S>(areas: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    areas
        .into_iter()
        .map(|area| normalize_area(area.as_ref()))
        .filter(|area| !area.is_empty() && seen.insert(area.clone()))
        .collect()
}

/// Enumerates consumers in a deterministic order.
///
/// Workspace members come first, area by area in the given order and sorted
/// by directory name within each area. Copies found by the store sweep are
/// appended afterwards, sorted by store entry name. A directory is listed
/// once even when areas overlap or repeat.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use singlescope::workspace::{enumerate_consumers, StoreLayout};
///
/// let areas = vec!["apps".to_string(), "packages".to_string()];
/// let consumers = enumerate_consumers(Path::new("."), &areas, "yjs", Some(&StoreLayout::default()))?;
/// for consumer in &consumers {
///     println!("{consumer}");
/// }
/// ```
pub fn enumerate_consumers(
    root: &Path,
    areas: &[String],
    package: &str,
    store: Option<&StoreLayout>,
) -> WalkResult<Vec<Consumer>> {
    if !root.is_dir() {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }

    let mut found = Vec::new();
    for area in dedup_areas(areas) {
        found.extend(list_area(&root.join(area))?);
    }
    if let Some(layout) = store {
        found.extend(layout.sweep(root, package));
    }

    let mut seen = HashSet::new();
    let mut consumers = Vec::with_capacity(found.len());
    for consumer in found {
        if seen.insert(consumer.path.clone()) {
            consumers.push(consumer);
        } else {
            debug!(consumer = %consumer, "already listed, skipping");
        }
    }

    Ok(consumers)
}

fn list_area(area: &Path) -> WalkResult<Vec<Consumer>> {
    if !area.is_dir() {
        debug!(area = %area.display(), "workspace area not present, skipping");
        return Ok(Vec::new());
    }

    let mut consumers = Vec::new();
    for entry in WalkDir::new(area)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| WalkError::AreaUnreadable {
            path: area.to_path_buf(),
            source,
        })?;

        let dir_name = entry.file_name().to_string_lossy();
        if dir_name.starts_with('.') || dir_name == "node_modules" {
            continue;
        }
        // is_dir follows symlinks so linked members count; dangling links do not
        if !entry.path().is_dir() {
            continue;
        }

        let path = entry.into_path();
        let name = package_name(&path);
        consumers.push(Consumer::workspace(path, name));
    }

    debug!(area = %area.display(), count = consumers.len(), "listed workspace area");
    Ok(consumers)
}
