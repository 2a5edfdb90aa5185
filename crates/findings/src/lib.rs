//! Core types for normalised scanner findings.
//!
//! A [`Finding`] is one issue reported by a supported security scanner,
//! flattened out of the scanner-specific JSON into a uniform shape. Everything
//! downstream (rule lookup, fix application, reporting) consumes findings and
//! never touches the raw scanner output again, except through [`Finding::raw`].

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Scanner whose output a finding came from.
pub enum Scanner {
    Bandit,
    Checkov,
    Opa,
    Semgrep,
    Trivy,
    Gitleaks,
}

impl Scanner {
    /// Every scanner with a results loader.
    pub const ALL: [Scanner; 6] = [
        Scanner::Bandit,
        Scanner::Checkov,
        Scanner::Opa,
        Scanner::Semgrep,
        Scanner::Trivy,
        Scanner::Gitleaks,
    ];

    /// Lowercase name used in report filenames and CLI values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scanner::Bandit => "bandit",
            Scanner::Checkov => "checkov",
            Scanner::Opa => "opa",
            Scanner::Semgrep => "semgrep",
            Scanner::Trivy => "trivy",
            Scanner::Gitleaks => "gitleaks",
        }
    }
}

impl fmt::Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scanner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bandit" => Ok(Scanner::Bandit),
            "checkov" => Ok(Scanner::Checkov),
            "opa" | "conftest" => Ok(Scanner::Opa),
            "semgrep" => Ok(Scanner::Semgrep),
            "trivy" => Ok(Scanner::Trivy),
            "gitleaks" => Ok(Scanner::Gitleaks),
            other => Err(format!("unknown scanner '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
/// Severity assigned to a finding. Ordered so thresholds compare.
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "info" | "unknown" | "note" => Ok(Severity::Low),
            "medium" | "moderate" | "warning" => Ok(Severity::Medium),
            "high" | "error" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

impl Severity {
    /// Best-effort parse used by the loaders: scanners disagree on casing and
    /// vocabulary, and plenty of outputs carry no severity at all.
    pub fn parse_or(s: Option<&str>, default: Severity) -> Severity {
        s.and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One normalised issue reported by a security scanner.
///
/// Read-only after creation: loaders build findings, nothing mutates them.
pub struct Finding {
    /// Stable identifier derived from the identifying tuple.
    pub id: String,
    /// Scanner that produced the record.
    pub scanner: Scanner,
    /// Scanner rule identifier (`B303`, `CKV_AWS_21`) or, for OPA, the
    /// free-text policy name.
    pub rule_id: String,
    /// Target file as reported, when the scanner names one.
    pub file: Option<PathBuf>,
    /// 1-based line, when the scanner reports one.
    pub line: Option<usize>,
    pub severity: Severity,
    /// Descriptive message from the scanner.
    pub message: String,
    /// Resource address (Terraform) or object name (k8s) when reported;
    /// fix functions anchor scoped substitutions to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Original scanner record, kept for report detail.
    #[serde(skip_serializing_if = "JsonValue::is_null", default)]
    pub raw: JsonValue,
}

impl Finding {
    /// Builds a finding and derives its stable id from the identifying tuple.
    ///
    /// # Example
    /// ```
    /// use findings::{Finding, Scanner, Severity};
    /// let f = Finding::new(
    ///     Scanner::Bandit,
    ///     "B303",
    ///     Some("app.py".into()),
    ///     Some(3),
    ///     Severity::Medium,
    ///     "Use of insecure MD5 hash function.",
    /// );
    /// assert_eq!(f.rule_id, "B303");
    /// assert!(!f.id.is_empty());
    /// ```
    pub fn new(
        scanner: Scanner,
        rule_id: impl Into<String>,
        file: Option<PathBuf>,
        line: Option<usize>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        let rule_id = rule_id.into();
        let id = stable_id(scanner, &rule_id, file.as_deref(), line);
        Finding {
            id,
            scanner,
            rule_id,
            file,
            line,
            severity,
            message: message.into(),
            resource: None,
            raw: JsonValue::Null,
        }
    }
}

/// Stable identifier for a finding: blake3 over `scanner:rule:file:line`.
/// Two records describing the same issue at the same location hash equal.
pub fn stable_id(scanner: Scanner, rule_id: &str, file: Option<&Path>, line: Option<usize>) -> String {
    let file = file.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
    let line = line.unwrap_or(0);
    blake3::hash(format!("{scanner}:{rule_id}:{file}:{line}").as_bytes())
        .to_hex()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn scanner_round_trips_through_str() {
        for s in Scanner::ALL {
            assert_eq!(s.as_str().parse::<Scanner>().unwrap(), s);
        }
        assert!("nessus".parse::<Scanner>().is_err());
    }

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_parses_scanner_aliases() {
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(Severity::parse_or(Some("bogus"), Severity::Medium), Severity::Medium);
        assert_eq!(Severity::parse_or(None, Severity::Low), Severity::Low);
    }

    #[test]
    fn stable_id_is_deterministic_and_location_sensitive() {
        let a = stable_id(Scanner::Bandit, "B303", Some(Path::new("a.py")), Some(3));
        let b = stable_id(Scanner::Bandit, "B303", Some(Path::new("a.py")), Some(3));
        let c = stable_id(Scanner::Bandit, "B303", Some(Path::new("a.py")), Some(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn finding_serializes_without_null_raw() {
        let f = Finding::new(
            Scanner::Checkov,
            "CKV_AWS_21",
            Some("main.tf".into()),
            Some(1),
            Severity::Medium,
            "Ensure the S3 bucket has versioning enabled",
        );
        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("raw").is_none());
        assert_eq!(json["severity"], "MEDIUM");
        assert_eq!(json["scanner"], "checkov");
    }
}
