//! Bandit JSON results (`bandit -f json`).

use crate::LoadedFindings;
use findings::{Finding, Scanner, Severity};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tracing::warn;

pub(crate) fn parse(doc: &JsonValue, out: &mut LoadedFindings) {
    let Some(results) = doc.get("results").and_then(|v| v.as_array()) else {
        // A document without `results` is a scan that produced nothing
        // usable, not an error in any single record.
        warn!("Scan results carry no `results` array");
        return;
    };
    for record in results {
        let Some(rule_id) = record.get("test_id").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Bandit, "missing test_id");
            continue;
        };
        let Some(filename) = record.get("filename").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Bandit, "missing filename");
            continue;
        };
        let line = record
            .get("line_number")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize);
        let severity = Severity::parse_or(
            record.get("issue_severity").and_then(|v| v.as_str()),
            Severity::Medium,
        );
        let message = record
            .get("issue_text")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let mut finding = Finding::new(
            Scanner::Bandit,
            rule_id,
            Some(PathBuf::from(filename)),
            line,
            severity,
            message,
        );
        finding.raw = record.clone();
        out.push(finding);
    }
}
