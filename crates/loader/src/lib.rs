//! Parses results files from supported security scanners into the
//! normalised [`findings::Finding`] representation.
//!
//! Each scanner writes a different JSON shape; the per-scanner modules
//! here know those shapes and nothing else. Records that do not carry
//! the fields a shape requires are counted as malformed and skipped so
//! that one broken record never aborts a run.

use anyhow::Context;
use findings::{Finding, Scanner};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

mod bandit;
mod checkov;
mod detect;
mod gitleaks;
mod opa;
mod semgrep;
mod trivy;

pub use detect::detect_scanner;

#[derive(Debug, Default)]
/// Findings normalised from one results file, plus the number of records
/// that could not be interpreted.
pub struct LoadedFindings {
    pub findings: Vec<Finding>,
    pub malformed: usize,
}

impl LoadedFindings {
    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Counts a record missing fields its scanner's format requires.
    /// Only the field name is logged; results files can embed source
    /// snippets and secrets, so record content never reaches the log.
    fn reject(&mut self, scanner: Scanner, detail: &str) {
        warn!(scanner = %scanner, detail, "Skipping malformed record");
        self.malformed += 1;
    }
}

/// Reads a results file from disk and parses it as JSON.
///
/// An unreadable file or invalid JSON is fatal; everything past this
/// point degrades per record instead.
pub fn read_scan_file(path: &Path) -> anyhow::Result<JsonValue> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan results: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse scan results: {}", path.display()))
}

/// Loads a results file and normalises its records.
///
/// With `scanner = None` the format is detected from the document shape;
/// detection failure is an error so the caller can ask for an explicit
/// `--scanner` instead of guessing.
///
/// # Example
/// ```no_run
/// use findings::Scanner;
/// let loaded = loader::load_findings(
///     std::path::Path::new("bandit_results.json"),
///     Some(Scanner::Bandit),
/// ).unwrap();
/// println!("{} findings", loaded.findings.len());
/// ```
pub fn load_findings(path: &Path, scanner: Option<Scanner>) -> anyhow::Result<LoadedFindings> {
    let doc = read_scan_file(path)?;
    let scanner = match scanner {
        Some(s) => s,
        None => detect_scanner(&doc)
            .with_context(|| format!("Unrecognised scan results format: {}", path.display()))?,
    };
    debug!(file = %path.display(), scanner = %scanner, "Parsing scan results");
    Ok(parse_findings(&doc, scanner))
}

/// Normalises every record in an already-parsed document.
///
/// Never fails: a document without the expected top-level keys yields an
/// empty list, and individual malformed records are counted and skipped.
pub fn parse_findings(doc: &JsonValue, scanner: Scanner) -> LoadedFindings {
    let mut out = LoadedFindings::default();
    match scanner {
        Scanner::Bandit => bandit::parse(doc, &mut out),
        Scanner::Checkov => checkov::parse(doc, &mut out),
        Scanner::Opa => opa::parse(doc, &mut out),
        Scanner::Semgrep => semgrep::parse(doc, &mut out),
        Scanner::Trivy => trivy::parse(doc, &mut out),
        Scanner::Gitleaks => gitleaks::parse(doc, &mut out),
    }
    debug!(
        scanner = %scanner,
        findings = out.findings.len(),
        malformed = out.malformed,
        "Normalised scan results"
    );
    out
}
