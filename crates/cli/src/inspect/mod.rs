//! The `inspect` command: show what a scan results file contains
//! without touching the project.

use anyhow::{Context, Result};
use tracing::info;

use crate::args::InspectArgs;
use crate::init_tracing;

use findings::Severity;
use loader::{detect_scanner, parse_findings, read_scan_file};
use reporters::InspectInfo;

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    init_tracing(args.quiet, args.debug);

    let doc = read_scan_file(&args.scan)?;
    let scanner = match args.scanner {
        Some(s) => s,
        None => detect_scanner(&doc).with_context(|| {
            format!("Unrecognised scan results format: {}", args.scan.display())
        })?,
    };
    let loaded = parse_findings(&doc, scanner);

    let rules = ::rules::RuleTable::builtin();
    let fixable = loaded
        .findings
        .iter()
        .filter(|f| rules.lookup(f).is_some())
        .count();
    let info = InspectInfo {
        scan_file: args.scan.clone(),
        scanner,
        fixable,
        malformed: loaded.malformed,
    };
    reporters::print_findings(&loaded.findings, args.format.into(), Some(&info))?;

    if let Some(thr) = args.fail_on {
        let max_sev: Option<Severity> = loaded.findings.iter().map(|f| f.severity).max();
        if max_sev.is_some_and(|sev| sev >= thr) {
            std::process::exit(1);
        }
    }
    info!(findings = loaded.findings.len(), "Inspect completed");
    Ok(())
}
