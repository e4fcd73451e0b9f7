//! Node-style resolution of a bare package name to a real file on disk.
//!
//! Starting from a consumer directory, the resolver walks up through the
//! ancestors looking for `node_modules/<package>`, picks the package's entry
//! point from its manifest (`exports`, then `main`, then `index`), and
//! canonicalizes the result so symlinked installs collapse onto the file they
//! point at.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use crate::parser::{read_manifest, PackageJson};

/// Default bound on upward directory walks.
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Export conditions accepted when reading an `exports` map, in no
/// particular priority; the manifest's key order decides.
pub const DEFAULT_CONDITIONS: &[&str] = &["node", "require", "import", "default"];

/// Extensions probed when an entry point is given without one.
const EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "json"];

const NODE_MODULES: &str = "node_modules";

/// Why a consumer could not be bound to a copy of the package.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    /// No `node_modules/<package>` directory within the depth bound.
    #[error("'{package}' is not installed within {max_depth} levels above {}", from.display())]
    NotInstalled {
        package: String,
        from: PathBuf,
        max_depth: usize,
    },

    /// The package directory exists but its entry file does not.
    #[error("broken install at {}: {reason}", package_dir.display())]
    BrokenInstall { package_dir: PathBuf, reason: String },
}

impl ResolutionFailure {
    fn broken(package_dir: &Path, reason: impl Into<String>) -> Self {
        Self::BrokenInstall {
            package_dir: package_dir.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly label for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotInstalled { .. } => "not-installed",
            Self::BrokenInstall { .. } => "broken-install",
        }
    }
}

/// Result of resolving a package: the real path of its entry file.
pub type ResolveResult = Result<PathBuf, ResolutionFailure>;

/// Memoized entry-point resolutions for a single scan.
///
/// Keyed by package directory, so consumers that share a hoisted install
/// only read its manifest once. Create one per scan and drop it afterwards.
#[derive(Debug, Default)]
pub struct ResolveCache {
    entries: HashMap<PathBuf, ResolveResult>,
    hits: usize,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of package directories resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered without touching the filesystem.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Resolves a package name the way Node's module loader would.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use singlescope::resolve::{ResolveCache, Resolver};
///
/// let resolver = Resolver::default();
/// let mut cache = ResolveCache::new();
/// let real = resolver.resolve(&mut cache, Path::new("apps/web"), "yjs")?;
/// println!("apps/web loads yjs from {}", real.display());
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    max_depth: usize,
    conditions: Vec<String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Resolver {
    /// Creates a resolver that examines at most `max_depth + 1` directories
    /// (the start directory and `max_depth` ancestors).
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            conditions: DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Replaces the accepted export conditions.
    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolves `package` as imported from `consumer_dir`.
    pub fn resolve(
        &self,
        cache: &mut ResolveCache,
        consumer_dir: &Path,
        package: &str,
    ) -> ResolveResult {
        let package_dir = self.find_package_dir(consumer_dir, package).ok_or_else(|| {
            ResolutionFailure::NotInstalled {
                package: package.to_string(),
                from: consumer_dir.to_path_buf(),
                max_depth: self.max_depth,
            }
        })?;
        trace!(package_dir = %package_dir.display(), "found package directory");
        self.resolve_package_dir(cache, &package_dir)
    }

    /// Finds the nearest `node_modules/<package>` directory above `from`.
    ///
    /// Directories that are themselves named `node_modules` are not searched
    /// for a nested `node_modules`, matching Node's lookup paths.
    pub fn find_package_dir(&self, from: &Path, package: &str) -> Option<PathBuf> {
        let mut current = Some(from);
        for _ in 0..=self.max_depth {
            let dir = current?;
            if dir.file_name().map_or(true, |name| name != NODE_MODULES) {
                let candidate = dir.join(NODE_MODULES).join(package);
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
            current = dir.parent();
        }
        None
    }

    /// Resolves the entry file of an already located package directory.
    pub fn resolve_package_dir(&self, cache: &mut ResolveCache, package_dir: &Path) -> ResolveResult {
        if let Some(hit) = cache.entries.get(package_dir) {
            cache.hits += 1;
            return hit.clone();
        }

        let result = self.resolve_entry(package_dir);
        cache
            .entries
            .insert(package_dir.to_path_buf(), result.clone());
        result
    }

    fn resolve_entry(&self, package_dir: &Path) -> ResolveResult {
        let manifest = match read_manifest(package_dir) {
            Some(Ok(manifest)) => Some(manifest),
            Some(Err(err)) => {
                debug!(
                    package_dir = %package_dir.display(),
                    error = %err,
                    "unreadable manifest, falling back to index"
                );
                None
            }
            None => None,
        };

        let entry_file = match manifest.as_ref().and_then(|m| self.select_entry(m)) {
            Some(entry) => {
                let target = package_dir.join(entry.trim_start_matches("./"));
                probe(&target).ok_or_else(|| {
                    ResolutionFailure::broken(package_dir, format!("entry point '{entry}' is missing"))
                })?
            }
            None => probe_index(package_dir).ok_or_else(|| {
                ResolutionFailure::broken(package_dir, "no entry point and no index file")
            })?,
        };

        entry_file.canonicalize().map_err(|err| {
            ResolutionFailure::broken(
                package_dir,
                format!("cannot resolve real path of {}: {err}", entry_file.display()),
            )
        })
    }

    /// Picks the entry point named by the manifest: `exports` root first,
    /// then `main`.
    fn select_entry(&self, manifest: &PackageJson) -> Option<String> {
        manifest
            .exports
            .as_ref()
            .and_then(|exports| self.exports_root(exports))
            .or_else(|| manifest.main.clone().filter(|main| !main.is_empty()))
    }

    fn exports_root(&self, exports: &Value) -> Option<String> {
        match exports {
            Value::String(target) => Some(target.clone()),
            Value::Object(map) if map.keys().any(|key| key.starts_with('.')) => {
                map.get(".").and_then(|root| self.match_conditions(root))
            }
            Value::Object(_) | Value::Array(_) => self.match_conditions(exports),
            _ => None,
        }
    }

    fn match_conditions(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(target) => Some(target.clone()),
            Value::Object(map) => map
                .iter()
                .filter(|(key, _)| self.conditions.iter().any(|c| c == *key))
                .find_map(|(_, target)| self.match_conditions(target)),
            Value::Array(targets) => targets.iter().find_map(|t| self.match_conditions(t)),
            _ => None,
        }
    }
}

/// Tries `target` as a file, with each probe extension appended, and as a
/// directory containing an index file.
fn probe(target: &Path) -> Option<PathBuf> {
    if target.is_file() {
        return Some(target.to_path_buf());
    }

    for ext in EXTENSIONS {
        let mut with_ext: OsString = target.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let with_ext = PathBuf::from(with_ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }

    if target.is_dir() {
        return probe_index(target);
    }
    None
}

fn probe_index(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index.{ext}")))
        .find(|index| index.is_file())
}
