//! JSON export implementation.
//!
//! Writes the report exactly as it serializes, pretty-printed, followed by a
//! newline.

use super::Exporter;
use crate::report::Report;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, report: &Report, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, ResolutionRecord};
    use crate::workspace::Consumer;
    use std::path::PathBuf;

    fn create_test_report() -> Report {
        let consumers = vec![
            Consumer::workspace("/ws/apps/web", None),
            Consumer::workspace("/ws/apps/api", None),
        ];
        let records = vec![
            ResolutionRecord::resolved(0, PathBuf::from("/ws/a/yjs.cjs"), Some("13.6.8".into())),
            ResolutionRecord::resolved(1, PathBuf::from("/ws/b/yjs.cjs"), Some("13.5.0".into())),
        ];
        let analysis = analyze(&records);
        Report::build(&consumers, &records, &analysis)
    }

    #[test]
    fn test_json_export_basic() {
        let report = create_test_report();
        let mut output = Vec::new();

        JsonExporter.export(&report, &mut output).unwrap();

        let json_str = String::from_utf8(output).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(parsed["scannedFiles"], 2);
        assert_eq!(parsed["flaggedFiles"], 2);
        assert_eq!(parsed["severity"], "error");
        assert_eq!(parsed["matches"][1]["consumer"], "/ws/apps/api");
        assert_eq!(parsed["matches"][1]["groupId"], "g2");
    }

    #[test]
    fn test_json_export_is_deterministic() {
        let report = create_test_report();
        let mut first = Vec::new();
        let mut second = Vec::new();

        JsonExporter.export(&report, &mut first).unwrap();
        JsonExporter.export(&report, &mut second).unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with(b"\n"));
    }
}
