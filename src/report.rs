//! The externally visible scan report.
//!
//! The serialized shape is a contract with CI scripts and the host app:
//! exactly four top-level keys (`scannedFiles`, `matches`, `flaggedFiles`,
//! `severity`) and one match per consumer in walk order.

use serde::Serialize;

use crate::analysis::{Analysis, ResolutionRecord, Severity};
use crate::workspace::Consumer;

/// One consumer's resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Consumer directory.
    pub consumer: String,
    /// Real path of the loaded file, or null when resolution failed.
    pub resolved_path: Option<String>,
    pub version: Option<String>,
    /// Id of the copy this consumer is bound to, or null when unresolved.
    pub group_id: Option<String>,
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub scanned_files: usize,
    pub matches: Vec<Match>,
    pub flagged_files: usize,
    pub severity: Severity,
}

impl Report {
    /// Assembles a report. Pure; performs no I/O.
    pub fn build(consumers: &[Consumer], records: &[ResolutionRecord], analysis: &Analysis) -> Self {
        let matches = records
            .iter()
            .map(|record| {
                let consumer = consumers
                    .get(record.consumer)
                    .map(|c| c.path.display().to_string())
                    .unwrap_or_default();
                let group_id = record
                    .resolved
                    .as_deref()
                    .and_then(|path| analysis.group_of(path))
                    .map(|group| group.id.clone());

                Match {
                    consumer,
                    resolved_path: record.resolved.as_ref().map(|p| p.display().to_string()),
                    version: record.version.clone(),
                    group_id,
                }
            })
            .collect();

        Self {
            scanned_files: consumers.len(),
            matches,
            flagged_files: analysis.flagged_count,
            severity: analysis.severity,
        }
    }

    /// Number of distinct copies referenced by the matches.
    pub fn copy_count(&self) -> usize {
        let mut ids: Vec<&str> = self
            .matches
            .iter()
            .filter_map(|m| m.group_id.as_deref())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Matches whose resolution failed.
    pub fn unresolved(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.resolved_path.is_none())
    }
}
