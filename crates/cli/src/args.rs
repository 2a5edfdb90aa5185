use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use findings::{Scanner, Severity};

use crate::output::{Format, SummaryFormat};

fn parse_scanner(s: &str) -> Result<Scanner, String> {
    s.parse()
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse()
}

pub fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn parse_threads(s: &str) -> Result<usize, String> {
    let v: usize = s
        .parse()
        .map_err(|e: std::num::ParseIntError| e.to_string())?;
    if v == 0 {
        Err("threads must be greater than 0".into())
    } else {
        Ok(v)
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "🔧 Remedium - Turns security scan findings into applied source fixes",
    long_about = "Remedium reads the JSON results of a security scanner, matches each
finding against a table of registered fix rules, and rewrites the flagged
source files in place. Every touched file gets a timestamped backup, and
every run leaves a JSON report as its durable record.

Supported scanners: bandit, checkov, opa/conftest, semgrep, trivy, gitleaks.

Examples:
  remedium fix bandit_results.json ./project        # apply fixes
  remedium fix scan.json ./project --no-auto-fix    # report without touching files
  remedium inspect scan.json --format sarif         # view findings as SARIF
  remedium rules list                               # show registered fix rules",
    subcommand_required = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Show version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply registered fixes to the findings in a scan results file
    Fix(FixArgs),
    /// List the findings in a scan results file without touching the project
    Inspect(InspectArgs),
    /// Show the built-in fix rules
    #[command(subcommand, alias = "rule")]
    Rules(RulesCmd),
}

#[derive(ClapArgs)]
pub struct FixArgs {
    /// Path to the scanner results JSON file
    pub scan: PathBuf,
    /// Project directory the findings refer to
    pub project: PathBuf,
    /// Scanner that produced the results (detected from the file shape when omitted)
    #[arg(long, value_parser = parse_scanner)]
    pub scanner: Option<Scanner>,
    /// Compute and report fixes without modifying any file
    #[arg(long = "no-auto-fix")]
    pub no_auto_fix: bool,
    /// Directory for fix reports, relative paths resolve against the project
    #[arg(long = "fixes-dir")]
    pub fixes_dir: Option<PathBuf>,
    /// Write a markdown fix guide next to the JSON report
    #[arg(long)]
    pub markdown: bool,
    /// Do not write backup files before mutating sources
    #[arg(long = "no-backup")]
    pub no_backup: bool,
    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,
    /// Number of parallel threads used to fix files
    #[arg(long, value_parser = parse_threads)]
    pub threads: Option<usize>,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,
}

#[derive(ClapArgs)]
pub struct InspectArgs {
    /// Path to the scanner results JSON file
    pub scan: PathBuf,
    /// Scanner that produced the results (detected from the file shape when omitted)
    #[arg(long, value_parser = parse_scanner)]
    pub scanner: Option<Scanner>,
    /// Exit with error code if findings of this severity or higher are present
    #[arg(long = "fail-on", value_parser = parse_severity)]
    pub fail_on: Option<Severity>,
    /// Output format for the findings
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum RulesCmd {
    /// List every registered fix rule
    List,
    /// Show one fix rule in detail
    Inspect {
        /// Rule ID to inspect
        id: String,
    },
}
