//! Semgrep JSON results (`semgrep --json`).

use crate::LoadedFindings;
use findings::{Finding, Scanner, Severity};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

pub(crate) fn parse(doc: &JsonValue, out: &mut LoadedFindings) {
    let Some(results) = doc.get("results").and_then(|v| v.as_array()) else {
        return;
    };
    for record in results {
        let Some(rule_id) = record.get("check_id").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Semgrep, "missing check_id");
            continue;
        };
        let Some(path) = record.get("path").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Semgrep, "missing path");
            continue;
        };
        let line = record
            .pointer("/start/line")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize);
        // Semgrep reports INFO/WARNING/ERROR rather than low/medium/high.
        let severity = Severity::parse_or(
            record.pointer("/extra/severity").and_then(|v| v.as_str()),
            Severity::Medium,
        );
        let message = record
            .pointer("/extra/message")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let mut finding = Finding::new(
            Scanner::Semgrep,
            rule_id,
            Some(PathBuf::from(path)),
            line,
            severity,
            message,
        );
        finding.raw = record.clone();
        out.push(finding);
    }
}
