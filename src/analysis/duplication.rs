//! Grouping of resolution outcomes by physical copy.
//!
//! Two consumers share a copy only when their resolutions end at the same
//! real path. Matching version strings do not make two files one copy.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::resolve::ResolutionFailure;

/// Outcome of resolving the target package from one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    /// Index of the consumer in walk order.
    pub consumer: usize,
    /// Real path of the loaded file, when resolution succeeded.
    pub resolved: Option<PathBuf>,
    /// Declared version of the loaded copy, when readable.
    pub version: Option<String>,
    /// Why resolution failed, when it did.
    pub failure: Option<ResolutionFailure>,
}

impl ResolutionRecord {
    pub fn resolved(consumer: usize, real_path: PathBuf, version: Option<String>) -> Self {
        Self {
            consumer,
            resolved: Some(real_path),
            version,
            failure: None,
        }
    }

    pub fn failed(consumer: usize, failure: ResolutionFailure) -> Self {
        Self {
            consumer,
            resolved: None,
            version: None,
            failure: Some(failure),
        }
    }
}

/// How bad the duplication found by a scan is.
///
/// Ordered so that callers can compare against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At most one real copy is in use.
    #[default]
    None,
    /// Two copies of the same declared version.
    Warning,
    /// Copies with different or unknown versions, or more than two copies.
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    fn from_groups(groups: &[DuplicationGroup]) -> Self {
        match groups {
            [] | [_] => Severity::None,
            [first, second] => match (&first.version, &second.version) {
                (Some(a), Some(b)) if a == b => Severity::Warning,
                _ => Severity::Error,
            },
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical copy and the consumers bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationGroup {
    /// Stable id, `g1`, `g2`, ... in order of first appearance.
    pub id: String,
    pub real_path: PathBuf,
    pub version: Option<String>,
    /// Consumer indices in walk order.
    pub consumers: Vec<usize>,
}

impl DuplicationGroup {
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

/// Result of analyzing one scan's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub groups: Vec<DuplicationGroup>,
    /// Consumers bound to any copy, once more than one copy exists.
    pub flagged_count: usize,
    pub severity: Severity,
}

impl Analysis {
    /// Returns true when more than one real copy is in use.
    pub fn is_duplicated(&self) -> bool {
        self.groups.len() > 1
    }

    /// Returns the group whose copy lives at `real_path`.
    pub fn group_of(&self, real_path: &Path) -> Option<&DuplicationGroup> {
        self.groups.iter().find(|g| g.real_path == real_path)
    }
}

/// Groups records by real path and derives the flagged count and severity.
///
/// Records without a resolved path take no part in grouping. Once more than
/// one group exists every grouped consumer is flagged, since resolution
/// alone cannot tell which copy a bundler will pick at runtime.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use singlescope::analysis::{analyze, ResolutionRecord, Severity};
///
/// let records = vec![
///     ResolutionRecord::resolved(0, PathBuf::from("/a/yjs.cjs"), Some("13.6.8".into())),
///     ResolutionRecord::resolved(1, PathBuf::from("/b/yjs.cjs"), Some("13.6.8".into())),
/// ];
/// let analysis = analyze(&records);
/// assert_eq!(analysis.severity, Severity::Warning);
/// assert_eq!(analysis.flagged_count, 2);
/// ```
pub fn analyze(records: &[ResolutionRecord]) -> Analysis {
    let mut groups: Vec<DuplicationGroup> = Vec::new();
    let mut index: HashMap<&Path, usize> = HashMap::new();

    for record in records {
        let Some(real_path) = record.resolved.as_deref() else {
            continue;
        };

        match index.get(real_path) {
            Some(&slot) => groups[slot].consumers.push(record.consumer),
            None => {
                index.insert(real_path, groups.len());
                groups.push(DuplicationGroup {
                    id: format!("g{}", groups.len() + 1),
                    real_path: real_path.to_path_buf(),
                    version: record.version.clone(),
                    consumers: vec![record.consumer],
                });
            }
        }
    }

    let flagged_count = if groups.len() > 1 {
        groups.iter().map(DuplicationGroup::len).sum::<usize>()
    } else {
        0
    };
    let severity = Severity::from_groups(&groups);

    Analysis {
        groups,
        flagged_count,
        severity,
    }
}
