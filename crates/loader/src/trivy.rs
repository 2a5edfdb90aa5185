//! Trivy JSON results (`trivy fs --format json`, `trivy config`).
//!
//! Vulnerabilities name a package inside a lockfile target and carry no
//! line; misconfigurations point into IaC files and do.

use crate::LoadedFindings;
use findings::{Finding, Scanner, Severity};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

pub(crate) fn parse(doc: &JsonValue, out: &mut LoadedFindings) {
    let Some(results) = doc.get("Results").and_then(|v| v.as_array()) else {
        return;
    };
    for result in results {
        let target = result.get("Target").and_then(|v| v.as_str());
        if let Some(vulns) = result.get("Vulnerabilities").and_then(|v| v.as_array()) {
            for record in vulns {
                parse_vulnerability(record, target, out);
            }
        }
        if let Some(misconfs) = result.get("Misconfigurations").and_then(|v| v.as_array()) {
            for record in misconfs {
                parse_misconfiguration(record, target, out);
            }
        }
    }
}

fn parse_vulnerability(record: &JsonValue, target: Option<&str>, out: &mut LoadedFindings) {
    let Some(rule_id) = record.get("VulnerabilityID").and_then(|v| v.as_str()) else {
        out.reject(Scanner::Trivy, "missing VulnerabilityID");
        return;
    };
    let severity = Severity::parse_or(
        record.get("Severity").and_then(|v| v.as_str()),
        Severity::Medium,
    );
    let pkg = record.get("PkgName").and_then(|v| v.as_str()).unwrap_or("?");
    let title = record
        .get("Title")
        .and_then(|v| v.as_str())
        .unwrap_or("Known vulnerability");
    let mut finding = Finding::new(
        Scanner::Trivy,
        rule_id,
        target.map(PathBuf::from),
        None,
        severity,
        format!("{title} ({pkg})"),
    );
    finding.resource = Some(pkg.to_string());
    finding.raw = record.clone();
    out.push(finding);
}

fn parse_misconfiguration(record: &JsonValue, target: Option<&str>, out: &mut LoadedFindings) {
    let Some(rule_id) = record.get("ID").and_then(|v| v.as_str()) else {
        out.reject(Scanner::Trivy, "missing ID");
        return;
    };
    let severity = Severity::parse_or(
        record.get("Severity").and_then(|v| v.as_str()),
        Severity::Medium,
    );
    let message = record
        .get("Message")
        .or_else(|| record.get("Title"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let line = record
        .pointer("/CauseMetadata/StartLine")
        .and_then(|v| v.as_u64())
        .map(|l| l as usize);
    let mut finding = Finding::new(
        Scanner::Trivy,
        rule_id,
        target.map(PathBuf::from),
        line,
        severity,
        message,
    );
    finding.raw = record.clone();
    out.push(finding);
}
