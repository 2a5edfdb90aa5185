use super::sample_report;
use crate::write_report;
use findings::Scanner;

#[test]
fn statistics_count_every_outcome() {
    let report = sample_report(false);
    assert_eq!(report.status, "completed");
    let s = &report.statistics;
    assert_eq!(s.total_findings, 3);
    assert_eq!(s.fixes_applied, 1);
    assert_eq!(s.fixes_skipped, 1);
    assert_eq!(s.files_modified, 1);
    assert_eq!(s.backups_created, 1);
    assert_eq!(s.malformed_records, 1);
}

#[test]
fn report_serialises_with_the_documented_keys() {
    let value = serde_json::to_value(sample_report(true)).unwrap();
    assert_eq!(value["status"], "dry-run");
    for key in [
        "status",
        "timestamp",
        "scan_file",
        "project",
        "statistics",
        "applied_fixes",
        "skipped_fixes",
        "backup_files",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    for key in [
        "total_findings",
        "fixes_applied",
        "fixes_skipped",
        "files_modified",
        "backups_created",
        "malformed_records",
    ] {
        assert!(value["statistics"].get(key).is_some(), "missing statistics.{key}");
    }
    assert_eq!(value["applied_fixes"][0]["rule_id"], "B303");
    assert_eq!(value["applied_fixes"][0]["line"], 3);
    assert_eq!(
        value["skipped_fixes"][0]["reason"],
        "No fix pattern available"
    );
    assert_eq!(value["backup_files"][0], "app.py.bak.20240601_120000");
}

#[test]
fn report_file_is_named_after_the_scanner() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_report(&sample_report(false), dir.path(), Scanner::Bandit).unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("bandit_fix_report_"), "got {name}");
    assert!(name.ends_with(".json"));
    assert_eq!(name.len(), "bandit_fix_report_YYYYMMDD_HHMMSS.json".len());
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["status"], "completed");
}

#[test]
fn report_directory_is_created_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let fixes_dir = dir.path().join("fixes");
    let path = write_report(&sample_report(false), &fixes_dir, Scanner::Checkov).unwrap();
    assert!(path.starts_with(&fixes_dir));
    assert!(path.exists());
}
