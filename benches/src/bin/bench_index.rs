//! Builds `target/criterion/index.html` linking every criterion report,
//! stamped with the commit and toolchain the numbers came from.

use chrono::Utc;
use std::fs;
use std::process::Command;

fn run_command(cmd: &str, args: &[&str]) -> std::io::Result<String> {
    let output = Command::new(cmd)
        .args(args)
        .output()
        .map_err(|e| std::io::Error::new(e.kind(), format!("failed to run {cmd}: {e}")))?;
    if !output.status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!(
                "{cmd} exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() -> std::io::Result<()> {
    let commit = run_command("git", &["rev-parse", "HEAD"])?;
    let date = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let rustc = run_command("rustc", &["--version"])?;

    let mut links = Vec::new();
    if let Ok(entries) = fs::read_dir("target/criterion") {
        for entry in entries.flatten() {
            if entry.file_type()?.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.path().join("report/index.html").exists() {
                    links.push(name);
                }
            }
        }
    }
    links.sort();

    let mut html = String::from(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Remedium benchmarks</title></head><body>",
    );
    html.push_str(&format!(
        "<p>commit: {commit}</p><p>date: {date}</p><p>rustc: {rustc}</p><ul>"
    ));
    for name in links {
        html.push_str(&format!(
            "<li><a href=\"{name}/report/index.html\">{name}</a></li>"
        ));
    }
    html.push_str("</ul></body></html>");

    fs::write("target/criterion/index.html", html)?;
    Ok(())
}
