use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::Result;

/// One contributor to an aggregated series: identifier, the weight it was
/// combined at, and the 12-character calendar-month bitstring.
///
/// Serializes as a JSON array so that an audit line reads
/// `<uid> <role> [["id", weight, "bitstring"], ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub id: String,
    pub weight: f64,
    pub months: String,
}

impl Contribution {
    pub fn new(id: String, weight: f64, months: String) -> Self {
        Self { id, weight, months }
    }
}

impl Serialize for Contribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.id, self.weight, &self.months).serialize(serializer)
    }
}

/// Audit trail port for the aggregation stages: one record per output unit,
/// listing every contributor considered (including those dropped at weight
/// 0). Not required for correctness, only for reproducibility.
pub trait AuditSink {
    fn record(&mut self, uid: &str, role: &str, contributors: &[Contribution]);
}

/// Discards all audit records.
pub struct NullAudit;

impl AuditSink for NullAudit {
    fn record(&mut self, _uid: &str, _role: &str, _contributors: &[Contribution]) {}
}

/// Collects audit lines in memory; used by tests.
#[derive(Default)]
pub struct MemoryAudit {
    pub lines: Vec<String>,
}

impl AuditSink for MemoryAudit {
    fn record(&mut self, uid: &str, role: &str, contributors: &[Contribution]) {
        self.lines.push(format_line(uid, role, contributors));
    }
}

/// Writes one audit line per record to a file.
pub struct FileAudit {
    writer: BufWriter<File>,
}

impl FileAudit {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl AuditSink for FileAudit {
    fn record(&mut self, uid: &str, role: &str, contributors: &[Contribution]) {
        let line = format_line(uid, role, contributors);
        if let Err(e) = writeln!(self.writer, "{}", line) {
            tracing::warn!("audit write failed: {}", e);
        }
    }
}

fn format_line(uid: &str, role: &str, contributors: &[Contribution]) -> String {
    // Contributions serialize to a list of [id, weight, bitstring] lists.
    let json = serde_json::to_string(contributors).unwrap_or_else(|_| "[]".to_string());
    format!("{} {} {}", uid, role, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let contributors = vec![
            Contribution::new("STN000000001".into(), 0.5, "111111111111".into()),
            Contribution::new("STN000000002".into(), 0.0, "000000000000".into()),
        ];
        let line = format_line("+00.0+005.0", "stations", &contributors);
        assert_eq!(
            line,
            "+00.0+005.0 stations [[\"STN000000001\",0.5,\"111111111111\"],[\"STN000000002\",0.0,\"000000000000\"]]"
        );
    }

    #[test]
    fn test_file_audit_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        {
            let mut audit = FileAudit::create(&path).unwrap();
            audit.record("UID", "cells", &[]);
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "UID cells []\n");
    }
}
