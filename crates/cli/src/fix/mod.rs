//! The `fix` command: load scan results, apply registered fixes to the
//! project, and write the JSON report.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::args::{default_threads, FixArgs};
use crate::config::load_config;
use crate::output::SummaryFormat;
use crate::{init_tracing, resolve_fixes_dir, ui};

use engine::{apply_fixes, FixConfig};
use loader::{detect_scanner, parse_findings, read_scan_file};
use reporters::FixReport;

pub fn run_fix(args: FixArgs) -> Result<()> {
    let user_cfg = load_config().context("failed to load configuration")?;
    init_tracing(args.quiet, args.debug);
    if args.debug && !args.quiet {
        debug!("Debug mode enabled");
    }

    if args.format == SummaryFormat::Text && !args.quiet {
        ui::print_header();
    }

    let threads = args
        .threads
        .or(user_cfg.run.threads)
        .unwrap_or_else(default_threads);
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        error!("Failed to build global thread pool: {e}");
    }

    let project = args
        .project
        .canonicalize()
        .with_context(|| format!("project directory not found: {}", args.project.display()))?;
    info!(scan = %args.scan.display(), project = %project.display(), "Fix run started");

    let doc = read_scan_file(&args.scan)?;
    let scanner = match args.scanner {
        Some(s) => s,
        None => detect_scanner(&doc).with_context(|| {
            format!("Unrecognised scan results format: {}", args.scan.display())
        })?,
    };
    let loaded = parse_findings(&doc, scanner);
    info!(scanner = %scanner, findings = loaded.findings.len(), "Scan results loaded");

    let fix_config = FixConfig {
        project_root: project.clone(),
        dry_run: args.no_auto_fix,
        backups: !args.no_backup && user_cfg.run.backups,
    };
    let rules = ::rules::RuleTable::builtin();
    let mut outcome = apply_fixes(loaded.findings, &rules, &fix_config);
    outcome.malformed_records = loaded.malformed;

    let report = FixReport::new(&outcome, &args.scan, &project, args.no_auto_fix);
    let fixes_dir = resolve_fixes_dir(
        &project,
        args.fixes_dir.as_deref().unwrap_or(&user_cfg.fixes.dir),
    );
    // The report is the durable record of the run; failing to write it
    // is fatal even though every fix already landed.
    let report_path = reporters::write_report(&report, &fixes_dir, scanner)
        .with_context(|| format!("Failed to write fix report to {}", fixes_dir.display()))?;
    info!(report = %report_path.display(), "Fix report written");

    if args.markdown {
        let guide_path = report_path.with_extension("md");
        reporters::write_markdown(&report, &rules, &guide_path)
            .with_context(|| format!("Failed to write fix guide to {}", guide_path.display()))?;
        info!(guide = %guide_path.display(), "Fix guide written");
    }

    reporters::print_summary(&report, args.format.into())?;
    info!(
        applied = report.statistics.fixes_applied,
        skipped = report.statistics.fixes_skipped,
        backups = report.statistics.backups_created,
        "Fix run completed"
    );
    Ok(())
}
