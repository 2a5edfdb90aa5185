use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn dry_run_reports_without_touching_the_tree() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let project = tmp.path().join("project");
    fs::create_dir(&project)?;
    let original = "h = hashlib.md5(x)\n";
    fs::write(project.join("a.py"), original)?;
    let scan = tmp.path().join("scan.json");
    fs::write(
        &scan,
        r#"{"results": [{"filename": "a.py", "line_number": 1, "test_id": "B303"}]}"#,
    )?;

    Command::cargo_bin("remedium")?
        .arg("fix")
        .arg(&scan)
        .arg(&project)
        .arg("--no-auto-fix")
        .env("HOME", tmp.path())
        .assert()
        .success()
        .stdout(contains("Dry run: no files were modified."));

    assert_eq!(fs::read_to_string(project.join("a.py"))?, original);
    let has_backup = fs::read_dir(&project)?
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().contains(".bak."));
    assert!(!has_backup, "dry run must not write backups");

    let report_path = fs::read_dir(project.join("fixes"))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .next()
        .ok_or("no report")?;
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(report_path)?)?;
    assert_eq!(report["status"], "dry-run");
    assert_eq!(report["statistics"]["fixes_applied"], 1);
    assert_eq!(report["statistics"]["backups_created"], 0);
    Ok(())
}
