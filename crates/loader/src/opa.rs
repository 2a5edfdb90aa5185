//! OPA / conftest policy results.
//!
//! Two shapes arrive in practice. Pipeline wrappers nest violations
//! under `results.opa.violations[]` with file, line and resource
//! metadata. Plain `conftest` output is `result[]` entries whose
//! violations are bare message strings. Both normalise into the same
//! finding, best effort; the policy name is the rule identifier in
//! either case.

use crate::LoadedFindings;
use findings::{Finding, Scanner, Severity};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

pub(crate) fn parse(doc: &JsonValue, out: &mut LoadedFindings) {
    if let Some(violations) = doc
        .pointer("/results/opa/violations")
        .and_then(|v| v.as_array())
    {
        for record in violations {
            parse_rich(record, out);
        }
        return;
    }
    if let Some(results) = doc.get("result").and_then(|v| v.as_array()) {
        for item in results {
            parse_generic(item, out);
        }
    }
}

fn parse_rich(record: &JsonValue, out: &mut LoadedFindings) {
    let Some(policy) = record.get("policy").and_then(|v| v.as_str()) else {
        out.reject(Scanner::Opa, "missing policy");
        return;
    };
    let message = record
        .get("message")
        .or_else(|| record.get("msg"))
        .and_then(|v| v.as_str())
        .unwrap_or(policy);
    let file = record
        .get("file")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let line = record.get("line").and_then(|v| v.as_u64()).map(|l| l as usize);
    let severity = Severity::parse_or(
        record.get("severity").and_then(|v| v.as_str()),
        Severity::Medium,
    );
    let mut finding = Finding::new(Scanner::Opa, policy, file, line, severity, message);
    finding.resource = record
        .pointer("/resource/name")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    finding.raw = record.clone();
    out.push(finding);
}

fn parse_generic(item: &JsonValue, out: &mut LoadedFindings) {
    let file = item
        .get("filename")
        .or_else(|| item.get("file"))
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(violations) = item
        .get("violations")
        .or_else(|| item.get("failures"))
        .and_then(|v| v.as_array())
    else {
        return;
    };
    for violation in violations {
        // Bare strings and `{msg: ...}` objects both occur; the message
        // doubles as the policy name for rule matching.
        let message = match violation {
            JsonValue::String(s) => Some(s.as_str()),
            _ => violation.get("msg").and_then(|v| v.as_str()),
        };
        let Some(message) = message else {
            out.reject(Scanner::Opa, "violation without message");
            continue;
        };
        let mut finding = Finding::new(
            Scanner::Opa,
            message,
            file.clone(),
            None,
            Severity::Medium,
            message,
        );
        finding.raw = violation.clone();
        out.push(finding);
    }
}
