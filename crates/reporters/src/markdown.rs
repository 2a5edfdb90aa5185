//! Markdown fix guide rendered alongside the JSON report.

use crate::FixReport;
use rules::RuleTable;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

fn line_cell(line: Option<usize>) -> String {
    line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Renders the human-facing remediation guide for a finished run.
pub fn render_markdown(report: &FixReport, rules: &RuleTable) -> String {
    let s = &report.statistics;
    let mut md = String::new();

    md.push_str("# Remediation Report\n\n");
    md.push_str(&format!("- **Status**: {}\n", report.status));
    md.push_str(&format!("- **Generated**: {}\n", report.timestamp));
    md.push_str(&format!(
        "- **Scan results**: `{}`\n",
        report.scan_file.display()
    ));
    md.push_str(&format!("- **Project**: `{}`\n\n", report.project.display()));

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Total findings | {} |\n", s.total_findings));
    md.push_str(&format!("| Fixes applied | {} |\n", s.fixes_applied));
    md.push_str(&format!("| Fixes skipped | {} |\n", s.fixes_skipped));
    md.push_str(&format!("| Files modified | {} |\n", s.files_modified));
    md.push_str(&format!("| Backups created | {} |\n", s.backups_created));
    md.push_str(&format!("| Malformed records | {} |\n\n", s.malformed_records));

    md.push_str("## Applied fixes\n\n");
    if report.applied_fixes.is_empty() {
        md.push_str("No fixes were applied.\n\n");
    } else {
        md.push_str("| File | Line | Rule | Fix |\n| --- | --- | --- | --- |\n");
        for fix in &report.applied_fixes {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                fix.file.display(),
                line_cell(fix.line),
                fix.rule_id,
                fix.fix
            ));
        }
        md.push('\n');
        let controls = compliance(report, rules);
        if !controls.is_empty() {
            md.push_str("### Compliance\n\n");
            md.push_str("Controls addressed by the fixes in this run:\n\n");
            for (tag, ids) in controls {
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                md.push_str(&format!("- **{tag}**: {}\n", ids.join(", ")));
            }
            md.push('\n');
        }
    }

    md.push_str("## Skipped findings\n\n");
    if report.skipped_fixes.is_empty() {
        md.push_str("Nothing was skipped.\n\n");
    } else {
        md.push_str("| File | Line | Rule | Reason |\n| --- | --- | --- | --- |\n");
        for fix in &report.skipped_fixes {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                fix.file.display(),
                line_cell(fix.line),
                fix.rule_id,
                fix.reason
            ));
        }
        md.push('\n');
    }

    if !report.backup_files.is_empty() {
        md.push_str("## Backups\n\n");
        md.push_str("Restore a file by copying its backup over the original.\n\n");
        for backup in &report.backup_files {
            md.push_str(&format!("- `{}`\n", backup.display()));
        }
        md.push('\n');
    }

    md
}

/// Compliance controls addressed by the applied fixes, each with the
/// rule ids that satisfied it.
fn compliance(report: &FixReport, rules: &RuleTable) -> BTreeMap<&'static str, BTreeSet<String>> {
    let mut map: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for fix in &report.applied_fixes {
        // OPA findings record the policy name, not the table id, so fall
        // back to matching the fix name.
        let rule = rules
            .get(&fix.rule_id)
            .or_else(|| rules.iter().find(|r| r.name == fix.fix));
        if let Some(rule) = rule {
            for &tag in rule.compliance {
                map.entry(tag).or_default().insert(fix.rule_id.clone());
            }
        }
    }
    map
}

/// Writes the rendered guide to `path`.
pub fn write_markdown(report: &FixReport, rules: &RuleTable, path: &Path) -> io::Result<()> {
    fs::write(path, render_markdown(report, rules))
}
