//! Markdown export implementation.
//!
//! Summarizes a report for people: counts, the copies in use, and the
//! consumers that could not be resolved.

use super::Exporter;
use crate::analysis::Severity;
use crate::report::{Match, Report};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

/// A copy as reconstructed from the matches bound to it.
struct CopyRow<'a> {
    group_id: &'a str,
    resolved_path: &'a str,
    version: Option<&'a str>,
    consumers: Vec<&'a str>,
}

fn copies(matches: &[Match]) -> Vec<CopyRow<'_>> {
    let mut rows: Vec<CopyRow<'_>> = Vec::new();
    for m in matches {
        let (Some(group_id), Some(resolved_path)) = (m.group_id.as_deref(), m.resolved_path.as_deref())
        else {
            continue;
        };
        match rows.iter_mut().find(|row| row.group_id == group_id) {
            Some(row) => row.consumers.push(m.consumer.as_str()),
            None => rows.push(CopyRow {
                group_id,
                resolved_path,
                version: m.version.as_deref(),
                consumers: vec![m.consumer.as_str()],
            }),
        }
    }
    rows
}

fn verdict(severity: Severity) -> &'static str {
    match severity {
        Severity::None => "All consumers share a single copy.",
        Severity::Warning => "Two copies of the same version are installed.",
        Severity::Error => "Multiple distinct copies are installed.",
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, report: &Report, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Singleton Dependency Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Severity:** {} - {}", report.severity, verdict(report.severity))?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Scanned | {} |", report.scanned_files)?;
        writeln!(writer, "| Flagged | {} |", report.flagged_files)?;
        writeln!(writer, "| Distinct Copies | {} |", report.copy_count())?;
        writeln!(writer, "| Unresolved | {} |", report.unresolved().count())?;
        writeln!(writer)?;

        let rows = copies(&report.matches);
        if !rows.is_empty() {
            writeln!(writer, "## Copies")?;
            writeln!(writer)?;
            writeln!(writer, "| Group | Version | Resolved Path | Consumers |")?;
            writeln!(writer, "|-------|---------|---------------|-----------|")?;
            for row in &rows {
                writeln!(
                    writer,
                    "| {} | {} | `{}` | {} |",
                    row.group_id,
                    row.version.unwrap_or("unknown"),
                    row.resolved_path,
                    row.consumers.len()
                )?;
            }
            writeln!(writer)?;

            if rows.len() > 1 {
                for row in &rows {
                    writeln!(writer, "### {}", row.group_id)?;
                    writeln!(writer)?;
                    for consumer in &row.consumers {
                        writeln!(writer, "- `{}`", consumer)?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        let unresolved: Vec<&Match> = report.unresolved().collect();
        if !unresolved.is_empty() {
            writeln!(writer, "## Unresolved")?;
            writeln!(writer)?;
            for m in unresolved {
                writeln!(writer, "- `{}`", m.consumer)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, ResolutionRecord};
    use crate::resolve::ResolutionFailure;
    use crate::workspace::Consumer;
    use std::path::PathBuf;

    fn render(report: &Report) -> String {
        let mut output = Vec::new();
        MarkdownExporter.export(report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_clean_workspace() {
        let consumers = vec![Consumer::workspace("/ws/apps/web", None)];
        let records = vec![ResolutionRecord::resolved(
            0,
            PathBuf::from("/ws/node_modules/yjs/index.js"),
            Some("13.6.8".into()),
        )];
        let report = Report::build(&consumers, &records, &analyze(&records));

        let md = render(&report);

        assert!(md.contains("**Severity:** none"));
        assert!(md.contains("| Scanned | 1 |"));
        assert!(md.contains("| g1 | 13.6.8 | `/ws/node_modules/yjs/index.js` | 1 |"));
        assert!(!md.contains("### g1"));
        assert!(!md.contains("## Unresolved"));
    }

    #[test]
    fn test_markdown_duplicated_workspace() {
        let consumers = vec![
            Consumer::workspace("/ws/apps/web", None),
            Consumer::workspace("/ws/apps/api", None),
            Consumer::workspace("/ws/apps/docs", None),
        ];
        let records = vec![
            ResolutionRecord::resolved(0, PathBuf::from("/a/yjs.cjs"), Some("13.6.8".into())),
            ResolutionRecord::resolved(1, PathBuf::from("/b/yjs.cjs"), None),
            ResolutionRecord::failed(
                2,
                ResolutionFailure::BrokenInstall {
                    package_dir: PathBuf::from("/ws/apps/docs/node_modules/yjs"),
                    reason: "no entry point and no index file".to_string(),
                },
            ),
        ];
        let report = Report::build(&consumers, &records, &analyze(&records));

        let md = render(&report);

        assert!(md.contains("**Severity:** error"));
        assert!(md.contains("| Distinct Copies | 2 |"));
        assert!(md.contains("| g2 | unknown |"));
        assert!(md.contains("### g1"));
        assert!(md.contains("## Unresolved"));
        assert!(md.contains("- `/ws/apps/docs`"));
    }
}
