//! Formatters for fix-run results in text, JSON and SARIF.
//! The JSON fix report is the durable record of a run; everything else
//! is console output for humans.

use engine::{AppliedFix, FixOutcome, SkippedFix};
use findings::{Finding, Scanner, Severity};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

mod markdown;
mod sarif;

pub use markdown::{render_markdown, write_markdown};

/// Returns the severity colored with simple ANSI codes.
/// Adds no external dependencies.
fn color_severity(sev: Severity) -> String {
    let (code, text) = match sev {
        Severity::Low => ("\x1b[32m", "LOW"),
        Severity::Medium => ("\x1b[33m", "MEDIUM"),
        Severity::High => ("\x1b[31m", "HIGH"),
        Severity::Critical => ("\x1b[31m", "CRITICAL"),
    };
    format!("{code}{text}\x1b[0m")
}

fn boxed(title: &str) -> String {
    let bar = "─".repeat(title.len() + 2);
    format!("╭{bar}╮\n│ {title} │\n╰{bar}╯\n")
}

fn location(file: &Path, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{line}", file.display()),
        None => file.display().to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Supported formats for printing results.
pub enum Format {
    /// Human-readable output in plain text.
    Text,
    /// JSON structure for integrations.
    Json,
    /// Report conforming to the SARIF specification.
    Sarif,
}

/// Counters block of the fix report.
#[derive(Debug, Serialize)]
pub struct Statistics {
    pub total_findings: usize,
    pub fixes_applied: usize,
    pub fixes_skipped: usize,
    pub files_modified: usize,
    pub backups_created: usize,
    pub malformed_records: usize,
}

/// The durable JSON record of one fix run.
#[derive(Debug, Serialize)]
pub struct FixReport {
    pub status: String,
    pub timestamp: String,
    pub scan_file: PathBuf,
    pub project: PathBuf,
    pub statistics: Statistics,
    pub applied_fixes: Vec<AppliedFix>,
    pub skipped_fixes: Vec<SkippedFix>,
    pub backup_files: Vec<PathBuf>,
}

impl FixReport {
    pub fn new(outcome: &FixOutcome, scan_file: &Path, project: &Path, dry_run: bool) -> Self {
        let status = if dry_run { "dry-run" } else { "completed" };
        FixReport {
            status: status.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            scan_file: scan_file.to_path_buf(),
            project: project.to_path_buf(),
            statistics: Statistics {
                total_findings: outcome.total_findings,
                fixes_applied: outcome.fixes_applied(),
                fixes_skipped: outcome.fixes_skipped(),
                files_modified: outcome.files_modified(),
                backups_created: outcome.backups().count(),
                malformed_records: outcome.malformed_records,
            },
            applied_fixes: outcome.applied().cloned().collect(),
            skipped_fixes: outcome.skipped().cloned().collect(),
            backup_files: outcome.backups().cloned().collect(),
        }
    }
}

/// Writes the JSON fix report under `dir`, creating the directory if
/// needed, and returns the report path.
pub fn write_report(report: &FixReport, dir: &Path, scanner: Scanner) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{scanner}_fix_report_{stamp}.json"));
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(&file, report)?;
    debug!(report = %path.display(), "Fix report written");
    Ok(path)
}

/// Estadísticas de la ejecución en estilo Semgrep
fn render_stats(report: &FixReport) -> String {
    let s = &report.statistics;
    let mut output = String::new();

    output.push_str("╭────────────────────╮\n");
    output.push_str("│ Remediation Status │\n");
    output.push_str("╰────────────────────╯\n");
    output.push('\n');

    output.push_str(&format!(
        "    Applied {} of {} finding(s) across {} file(s):\n\n",
        s.fixes_applied, s.total_findings, s.files_modified
    ));

    output.push_str("    STATISTICS\n");
    output.push_str(
        "    ──────────────────────────────────────────────────────────────────────────────\n",
    );
    output.push('\n');
    output.push_str("    Metric                    Value\n");
    output.push_str(
        "    ──────────────────────────────────────────────────────────────────────────────\n",
    );
    output.push_str(&format!("    Fixes applied             {}\n", s.fixes_applied));
    output.push_str(&format!("    Fixes skipped             {}\n", s.fixes_skipped));
    output.push_str(&format!("    Files modified            {}\n", s.files_modified));
    output.push_str(&format!("    Backups created           {}\n", s.backups_created));
    output.push_str(&format!(
        "    Malformed records         {}\n",
        s.malformed_records
    ));

    output
}

/// Prints the fix-run summary in the selected format.
///
/// # Example
/// ```
/// use engine::FixOutcome;
/// use reporters::{print_summary, FixReport, Format};
/// use std::path::Path;
/// let outcome = FixOutcome::default();
/// let report = FixReport::new(&outcome, Path::new("scan.json"), Path::new("."), true);
/// print_summary(&report, Format::Text).unwrap();
/// ```
pub fn print_summary(report: &FixReport, fmt: Format) -> io::Result<()> {
    let mut out = io::stdout();
    write_summary(&mut out, report, fmt)
}

/// Writes the summary to a generic `Write`, used for tests.
pub(crate) fn write_summary<W: Write>(
    out: &mut W,
    report: &FixReport,
    fmt: Format,
) -> io::Result<()> {
    match fmt {
        Format::Text => {
            writeln!(out, "{}", render_stats(report))?;
            if !report.applied_fixes.is_empty() {
                writeln!(out, "{}", boxed("Applied"))?;
                for fix in &report.applied_fixes {
                    writeln!(
                        out,
                        "✔ {} {} {}",
                        location(&fix.file, fix.line),
                        fix.rule_id,
                        fix.fix
                    )?;
                }
                writeln!(out)?;
            }
            if !report.skipped_fixes.is_empty() {
                writeln!(out, "{}", boxed("Skipped"))?;
                for fix in &report.skipped_fixes {
                    writeln!(
                        out,
                        "⚠ {} {} {}",
                        location(&fix.file, fix.line),
                        fix.rule_id,
                        fix.reason
                    )?;
                }
                writeln!(out)?;
            }
            if report.status == "dry-run" {
                writeln!(out, "Dry run: no files were modified.")?;
            }
        }
        // the summary has no SARIF rendering; machine formats get the report JSON
        Format::Json | Format::Sarif => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
/// Simple wrapper used when serialising findings to JSON.
struct FindingsOut<'a> {
    findings: &'a [Finding],
    total: usize,
}

/// Context shown above inspected findings.
pub struct InspectInfo {
    pub scan_file: PathBuf,
    pub scanner: Scanner,
    pub fixable: usize,
    pub malformed: usize,
}

/// Prints loaded findings in the selected format.
pub fn print_findings(
    findings: &[Finding],
    fmt: Format,
    info: Option<&InspectInfo>,
) -> io::Result<()> {
    let mut out = io::stdout();
    write_findings(&mut out, findings, fmt, info)
}

/// Writes findings to a generic `Write`, used for tests.
pub(crate) fn write_findings<W: Write>(
    out: &mut W,
    findings: &[Finding],
    fmt: Format,
    info: Option<&InspectInfo>,
) -> io::Result<()> {
    match fmt {
        Format::Text => {
            if let Some(info) = info {
                writeln!(out, "{}", boxed("Scan Results"))?;
                writeln!(out, "    Source      {}", info.scan_file.display())?;
                writeln!(out, "    Scanner     {}", info.scanner)?;
                writeln!(out, "    Findings    {}", findings.len())?;
                writeln!(out, "    Fixable     {}", info.fixable)?;
                if info.malformed > 0 {
                    writeln!(out, "    Malformed   {}", info.malformed)?;
                }
                writeln!(out)?;
            }
            if findings.is_empty() {
                writeln!(out, "✔ No findings.")?;
            } else {
                for f in findings {
                    let place = match (&f.file, f.line) {
                        (Some(file), line) => location(file, line),
                        (None, _) => "-".to_string(),
                    };
                    writeln!(
                        out,
                        "{} {} {}",
                        color_severity(f.severity),
                        place,
                        f.rule_id
                    )?;
                    writeln!(out, "    {}", f.message)?;
                    if let Some(resource) = &f.resource {
                        writeln!(out, "    ↳  {resource}")?;
                    }
                    writeln!(out)?;
                }
                writeln!(out, "Total: {}", findings.len())?;
            }
        }
        Format::Json => {
            let json = FindingsOut {
                findings,
                total: findings.len(),
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
        Format::Sarif => {
            let sarif = sarif::to_sarif(findings);
            serde_json::to_writer_pretty(&mut *out, &sarif)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
