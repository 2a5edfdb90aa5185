//! Applies registered fixes to the files a scan flagged.
//!
//! Findings are grouped per target file, each file runs as an isolated
//! session (backup, fix application, write-back), and sessions execute
//! in parallel on the rayon pool. Session outcomes are merged into one
//! [`FixOutcome`] sorted by path so reports come out deterministic.

use chrono::Local;
use findings::Finding;
use rayon::prelude::*;
use rules::RuleTable;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

mod session;

use session::run_session;

#[derive(Debug, Clone)]
/// Run-wide settings for one fix pass.
pub struct FixConfig {
    /// Directory relative finding paths resolve against.
    pub project_root: PathBuf,
    /// Compute outcomes without writing backups or files.
    pub dry_run: bool,
    /// Write a timestamped backup before mutating each file.
    pub backups: bool,
}

#[derive(Debug, Clone, Serialize)]
/// One successfully applied fix.
pub struct AppliedFix {
    pub file: PathBuf,
    pub line: Option<usize>,
    pub rule_id: String,
    pub fix: String,
}

#[derive(Debug, Clone, Serialize)]
/// One finding that was not fixed, and why.
pub struct SkippedFix {
    pub file: PathBuf,
    pub line: Option<usize>,
    pub rule_id: String,
    pub reason: String,
}

#[derive(Debug)]
/// Everything that happened to one file.
pub struct FileOutcome {
    pub path: PathBuf,
    pub applied: Vec<AppliedFix>,
    pub skipped: Vec<SkippedFix>,
    pub backup: Option<PathBuf>,
    pub modified: bool,
}

#[derive(Debug, Default)]
/// Merged result of a whole fix pass.
pub struct FixOutcome {
    /// Per-file outcomes, sorted by path.
    pub files: Vec<FileOutcome>,
    /// Findings seen in the scan, including ones dropped for a missing file.
    pub total_findings: usize,
    /// Findings dropped because their file does not exist (or they had none).
    pub missing_files: usize,
    /// Records the loader could not interpret; set by the caller.
    pub malformed_records: usize,
}

impl FixOutcome {
    pub fn fixes_applied(&self) -> usize {
        self.files.iter().map(|f| f.applied.len()).sum()
    }

    pub fn fixes_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped.len()).sum()
    }

    pub fn files_modified(&self) -> usize {
        self.files.iter().filter(|f| f.modified).count()
    }

    pub fn backups(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter().filter_map(|f| f.backup.as_ref())
    }

    pub fn applied(&self) -> impl Iterator<Item = &AppliedFix> {
        self.files.iter().flat_map(|f| f.applied.iter())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedFix> {
        self.files.iter().flat_map(|f| f.skipped.iter())
    }
}

/// Findings destined for one file, plus duplicates already diverted.
pub(crate) struct FileGroup {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
    pub duplicates: Vec<SkippedFix>,
}

/// Partitions findings by resolved target file.
///
/// Relative paths resolve against `project_root`; findings whose file
/// does not exist (or that have none) are dropped with a warning, and
/// exact duplicates (same scanner, rule and line) after the first are
/// diverted to skips so every kept finding lands in exactly one of
/// applied or skipped later.
pub(crate) fn group_findings(
    findings: Vec<Finding>,
    project_root: &Path,
) -> (Vec<FileGroup>, usize) {
    let mut groups: HashMap<PathBuf, FileGroup> = HashMap::new();
    let mut seen: HashSet<(PathBuf, String, Option<usize>)> = HashSet::new();
    let mut missing = 0usize;
    for finding in findings {
        let Some(file) = finding.file.as_deref() else {
            warn!(rule = %finding.rule_id, "Skipping finding without a file");
            missing += 1;
            continue;
        };
        let resolved = if file.is_absolute() {
            file.to_path_buf()
        } else {
            project_root.join(file)
        };
        if !resolved.exists() {
            warn!(file = %resolved.display(), rule = %finding.rule_id, "Skipping finding for missing file");
            missing += 1;
            continue;
        }
        let key = (
            resolved.clone(),
            format!("{}:{}", finding.scanner, finding.rule_id),
            finding.line,
        );
        let group = groups.entry(resolved.clone()).or_insert_with(|| FileGroup {
            path: resolved,
            findings: Vec::new(),
            duplicates: Vec::new(),
        });
        if seen.insert(key) {
            group.findings.push(finding);
        } else {
            group.duplicates.push(SkippedFix {
                file: group.path.clone(),
                line: finding.line,
                rule_id: finding.rule_id,
                reason: "Duplicate finding".to_string(),
            });
        }
    }
    let mut groups: Vec<FileGroup> = groups.into_values().collect();
    groups.sort_by(|a, b| a.path.cmp(&b.path));
    (groups, missing)
}

/// Runs the whole fix pass: group, per-file sessions in parallel, merge.
pub fn apply_fixes(findings: Vec<Finding>, rules: &RuleTable, config: &FixConfig) -> FixOutcome {
    let total_findings = findings.len();
    let (groups, missing_files) = group_findings(findings, &config.project_root);
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut files: Vec<FileOutcome> = groups
        .into_par_iter()
        .map(|group| run_session(group, rules, config, &stamp))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    FixOutcome {
        files,
        total_findings,
        missing_files,
        malformed_records: 0,
    }
}
