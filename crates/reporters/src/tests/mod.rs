use crate::FixReport;
use engine::{AppliedFix, FileOutcome, FixOutcome, SkippedFix};
use std::path::{Path, PathBuf};

mod markdown;
mod report;

pub(crate) fn sample_outcome() -> FixOutcome {
    FixOutcome {
        files: vec![FileOutcome {
            path: PathBuf::from("app.py"),
            applied: vec![AppliedFix {
                file: PathBuf::from("app.py"),
                line: Some(3),
                rule_id: "B303".to_string(),
                fix: "Replace insecure hash".to_string(),
            }],
            skipped: vec![SkippedFix {
                file: PathBuf::from("app.py"),
                line: Some(9),
                rule_id: "B999".to_string(),
                reason: "No fix pattern available".to_string(),
            }],
            backup: Some(PathBuf::from("app.py.bak.20240601_120000")),
            modified: true,
        }],
        total_findings: 3,
        missing_files: 1,
        malformed_records: 1,
    }
}

pub(crate) fn sample_report(dry_run: bool) -> FixReport {
    FixReport::new(
        &sample_outcome(),
        Path::new("bandit_results.json"),
        Path::new("/tmp/project"),
        dry_run,
    )
}
