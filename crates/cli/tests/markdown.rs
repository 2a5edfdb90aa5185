use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn markdown_flag_writes_a_guide_next_to_the_report() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let project = tmp.path().join("project");
    fs::create_dir(&project)?;
    fs::write(project.join("a.py"), "h = hashlib.md5(x)\n")?;
    let scan = tmp.path().join("scan.json");
    fs::write(
        &scan,
        r#"{"results": [{"filename": "a.py", "line_number": 1, "test_id": "B303"}]}"#,
    )?;

    Command::cargo_bin("remedium")?
        .arg("fix")
        .arg(&scan)
        .arg(&project)
        .arg("--markdown")
        .env("HOME", tmp.path())
        .assert()
        .success()
        .stderr(contains("Fix guide written"));

    let guide_path = fs::read_dir(project.join("fixes"))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.extension().is_some_and(|e| e == "md"))
        .ok_or("no guide")?;
    let guide = fs::read_to_string(guide_path)?;
    assert!(guide.contains("# Remediation Report"));
    assert!(guide.contains("B303"));
    assert!(guide.contains("Replace insecure hash"));
    Ok(())
}
