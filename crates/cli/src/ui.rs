//! User interface functions for the CLI.
//! Contains helpers for displaying the header and other visual elements.

pub fn print_header() {
    let version = env!("CARGO_PKG_VERSION");
    // Avoid panics when the version exceeds the expected width
    let spaces = " ".repeat(24usize.saturating_sub(version.len()));
    eprintln!(
        r#"
    ╭──────────────────────────────────────╮
    │                                      │
    │     🔧  REMEDIUM  FIX  ENGINE  🔧    │
    │                                      │
    │     Scan findings in,                │
    │     applied fixes out                │
    │     Version: {version}{spaces}│
    │                                      │
    ╰──────────────────────────────────────╯
"#
    );
}
