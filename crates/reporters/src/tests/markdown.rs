use super::sample_report;
use crate::render_markdown;
use rules::RuleTable;

#[test]
fn guide_tables_cover_applied_and_skipped() {
    let md = render_markdown(&sample_report(false), &RuleTable::builtin());
    assert!(md.starts_with("# Remediation Report"));
    assert!(md.contains("| Total findings | 3 |"));
    assert!(md.contains("| `app.py` | 3 | B303 | Replace insecure hash |"));
    assert!(md.contains("| `app.py` | 9 | B999 | No fix pattern available |"));
    assert!(md.contains("## Backups"));
    assert!(md.contains("- `app.py.bak.20240601_120000`"));
}

#[test]
fn compliance_section_maps_controls_to_rules() {
    let md = render_markdown(&sample_report(false), &RuleTable::builtin());
    assert!(md.contains("### Compliance"));
    // B303 is registered with at least one control tag
    let rule = RuleTable::builtin().get("B303").unwrap();
    let tag = rule.compliance[0];
    assert!(md.contains(&format!("**{tag}**: B303")), "missing {tag} in:\n{md}");
}

#[test]
fn empty_run_renders_placeholders() {
    let mut report = sample_report(false);
    report.applied_fixes.clear();
    report.skipped_fixes.clear();
    report.backup_files.clear();
    let md = render_markdown(&report, &RuleTable::builtin());
    assert!(md.contains("No fixes were applied."));
    assert!(md.contains("Nothing was skipped."));
    assert!(!md.contains("## Backups"));
    assert!(!md.contains("### Compliance"));
}
