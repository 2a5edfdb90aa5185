//! Scanner-format detection for results files supplied without an
//! explicit `--scanner`.

use findings::Scanner;
use serde_json::Value as JsonValue;

/// Guesses which scanner produced `doc` from its top-level shape.
///
/// Checks run in a fixed order and the first hit wins, so a document is
/// always classified the same way. Returns `None` when no shape matches;
/// callers should then require an explicit scanner rather than guess.
pub fn detect_scanner(doc: &JsonValue) -> Option<Scanner> {
    match doc {
        // Gitleaks and multi-framework Checkov both emit bare arrays.
        JsonValue::Array(items) => {
            if items.iter().any(|v| v.get("RuleID").is_some()) {
                return Some(Scanner::Gitleaks);
            }
            if items.iter().any(|v| {
                v.get("check_type").is_some() || v.pointer("/results/failed_checks").is_some()
            }) {
                return Some(Scanner::Checkov);
            }
            None
        }
        JsonValue::Object(_) => {
            if doc.pointer("/results/opa").is_some() {
                return Some(Scanner::Opa);
            }
            if doc.get("check_type").is_some() || doc.pointer("/results/failed_checks").is_some() {
                return Some(Scanner::Checkov);
            }
            if let Some(results) = doc.get("results").and_then(|v| v.as_array()) {
                if results.iter().any(|r| r.get("test_id").is_some()) {
                    return Some(Scanner::Bandit);
                }
                if results
                    .iter()
                    .any(|r| r.get("check_id").is_some() && r.get("path").is_some())
                {
                    return Some(Scanner::Semgrep);
                }
                // A clean scan has an empty results array; fall back to
                // sibling keys only one of the two formats writes.
                if doc.get("metrics").is_some() {
                    return Some(Scanner::Bandit);
                }
                if doc.get("paths").is_some() {
                    return Some(Scanner::Semgrep);
                }
            }
            if doc.get("Results").is_some() || doc.get("SchemaVersion").is_some() {
                return Some(Scanner::Trivy);
            }
            if doc.get("result").is_some() {
                return Some(Scanner::Opa);
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_bandit_by_test_id() {
        let doc = json!({"results": [{"test_id": "B105", "filename": "a.py"}]});
        assert_eq!(detect_scanner(&doc), Some(Scanner::Bandit));
    }

    #[test]
    fn detects_bandit_clean_scan_by_metrics() {
        let doc = json!({"results": [], "metrics": {"_totals": {}}, "errors": []});
        assert_eq!(detect_scanner(&doc), Some(Scanner::Bandit));
    }

    #[test]
    fn detects_checkov_object_and_array() {
        let single = json!({"check_type": "terraform", "results": {"failed_checks": []}});
        assert_eq!(detect_scanner(&single), Some(Scanner::Checkov));
        let multi = json!([{"check_type": "terraform", "results": {"failed_checks": []}}]);
        assert_eq!(detect_scanner(&multi), Some(Scanner::Checkov));
    }

    #[test]
    fn detects_rich_and_generic_opa_shapes() {
        let rich = json!({"results": {"opa": {"violations": []}}});
        assert_eq!(detect_scanner(&rich), Some(Scanner::Opa));
        let generic = json!({"result": [{"filename": "deploy.yaml", "violations": []}]});
        assert_eq!(detect_scanner(&generic), Some(Scanner::Opa));
    }

    #[test]
    fn detects_semgrep_by_check_id_and_path() {
        let doc = json!({"results": [{"check_id": "python.lang.security", "path": "a.py"}]});
        assert_eq!(detect_scanner(&doc), Some(Scanner::Semgrep));
    }

    #[test]
    fn detects_trivy_by_schema_version() {
        let doc = json!({"SchemaVersion": 2, "Results": []});
        assert_eq!(detect_scanner(&doc), Some(Scanner::Trivy));
    }

    #[test]
    fn detects_gitleaks_array() {
        let doc = json!([{"RuleID": "aws-access-key", "File": "config.py", "StartLine": 7}]);
        assert_eq!(detect_scanner(&doc), Some(Scanner::Gitleaks));
    }

    #[test]
    fn unknown_shapes_return_none() {
        assert_eq!(detect_scanner(&json!({"hello": "world"})), None);
        assert_eq!(detect_scanner(&json!([1, 2, 3])), None);
        assert_eq!(detect_scanner(&json!("scalar")), None);
    }
}
