//! Checkov JSON results (`checkov -o json`).
//!
//! Checkov writes one report object per framework and a bare array when
//! several frameworks ran; both carry findings under
//! `results.failed_checks`.

use crate::LoadedFindings;
use findings::{Finding, Scanner, Severity};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

pub(crate) fn parse(doc: &JsonValue, out: &mut LoadedFindings) {
    match doc {
        JsonValue::Array(reports) => {
            for report in reports {
                parse_report(report, out);
            }
        }
        _ => parse_report(doc, out),
    }
}

fn parse_report(report: &JsonValue, out: &mut LoadedFindings) {
    // A framework with nothing failed has no failed_checks; that is a
    // clean result, not a malformed one.
    let Some(failed) = report
        .pointer("/results/failed_checks")
        .and_then(|v| v.as_array())
    else {
        return;
    };
    for record in failed {
        let Some(rule_id) = record.get("check_id").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Checkov, "missing check_id");
            continue;
        };
        let Some(file_path) = record.get("file_path").and_then(|v| v.as_str()) else {
            out.reject(Scanner::Checkov, "missing file_path");
            continue;
        };
        // Checkov prefixes paths with '/' relative to the scanned root.
        let file_path = file_path.strip_prefix('/').unwrap_or(file_path);
        let line = record
            .pointer("/file_line_range/0")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize);
        let severity = Severity::parse_or(
            record.get("severity").and_then(|v| v.as_str()),
            Severity::Medium,
        );
        let message = record
            .get("check_name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let mut finding = Finding::new(
            Scanner::Checkov,
            rule_id,
            Some(PathBuf::from(file_path)),
            line,
            severity,
            message,
        );
        finding.resource = record
            .get("resource")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        finding.raw = record.clone();
        out.push(finding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn failed_check(id: &str, file: &str, resource: &str) -> JsonValue {
        json!({
            "check_id": id,
            "check_name": "Ensure the thing is configured",
            "file_path": file,
            "file_line_range": [4, 12],
            "resource": resource,
            "severity": null,
            "guideline": "https://docs.prismacloud.io/policy-reference"
        })
    }

    #[test]
    fn flattens_single_report() {
        let doc = json!({
            "check_type": "terraform",
            "results": {"failed_checks": [failed_check("CKV_AWS_18", "/s3.tf", "aws_s3_bucket.logs")]}
        });
        let mut out = LoadedFindings::default();
        parse(&doc, &mut out);
        assert_eq!(out.findings.len(), 1);
        let f = &out.findings[0];
        assert_eq!(f.rule_id, "CKV_AWS_18");
        assert_eq!(f.file.as_deref(), Some(Path::new("s3.tf")));
        assert_eq!(f.line, Some(4));
        assert_eq!(f.resource.as_deref(), Some("aws_s3_bucket.logs"));
    }

    #[test]
    fn flattens_multi_framework_array() {
        let doc = json!([
            {"check_type": "terraform",
             "results": {"failed_checks": [failed_check("CKV_AWS_20", "/main.tf", "aws_s3_bucket.a")]}},
            {"check_type": "kubernetes",
             "results": {"failed_checks": [failed_check("CKV_K8S_20", "/deploy.yaml", "Deployment.web")]}},
            {"check_type": "secrets", "results": {"passed_checks": []}}
        ]);
        let mut out = LoadedFindings::default();
        parse(&doc, &mut out);
        assert_eq!(out.findings.len(), 2);
        assert_eq!(out.findings[0].rule_id, "CKV_AWS_20");
        assert_eq!(out.findings[1].rule_id, "CKV_K8S_20");
    }

    #[test]
    fn null_severity_defaults_to_medium() {
        let doc = json!({
            "results": {"failed_checks": [failed_check("CKV_AWS_21", "/b.tf", "aws_s3_bucket.b")]}
        });
        let mut out = LoadedFindings::default();
        parse(&doc, &mut out);
        assert_eq!(out.findings[0].severity, Severity::Medium);
    }

    #[test]
    fn record_without_file_path_is_malformed() {
        let doc = json!({
            "results": {"failed_checks": [{"check_id": "CKV_AWS_16", "check_name": "x"}]}
        });
        let mut out = LoadedFindings::default();
        parse(&doc, &mut out);
        assert!(out.findings.is_empty());
        assert_eq!(out.malformed, 1);
    }
}
