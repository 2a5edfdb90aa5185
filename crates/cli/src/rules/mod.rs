//! The `rules` command: list and inspect the built-in fix rules.

use anyhow::{bail, Result};
use colored::*;
use std::env;

use ::rules::{FixKind, RuleTable};

/// Check if colored output should be used
fn use_colored_output() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" || term == "unknown" {
            return false;
        }
    }
    if env::var("CI").is_ok() || env::var("CONTINUOUS_INTEGRATION").is_ok() {
        return false;
    }
    true
}

fn kind_label(kind: FixKind) -> &'static str {
    match kind {
        FixKind::Text(_) => "text",
        FixKind::YamlDoc(_) => "yaml",
    }
}

pub fn list_rules() -> Result<()> {
    let table = RuleTable::builtin();
    println!("{} fix rules registered:\n", table.len());
    println!("    {:<18} {:<6} NAME", "ID", "KIND");
    println!(
        "    ──────────────────────────────────────────────────────────────────────────────"
    );
    for rule in table.iter() {
        // pad before coloring so escape codes do not break the columns
        let id = format!("{:<18}", rule.id);
        if use_colored_output() {
            println!("    {} {:<6} {}", id.bright_white().bold(), kind_label(rule.kind), rule.name);
        } else {
            println!("    {id} {:<6} {}", kind_label(rule.kind), rule.name);
        }
    }
    Ok(())
}

pub fn inspect_rule(id: &str) -> Result<()> {
    let table = RuleTable::builtin();
    let Some(rule) = table.get(id) else {
        bail!("no fix rule registered with id `{id}`");
    };
    if use_colored_output() {
        println!("{}", rule.id.bright_white().bold());
        println!("    Name         {}", rule.name.bright_cyan());
        println!("    Description  {}", rule.description);
        println!("    Kind         {}", kind_label(rule.kind));
        if !rule.compliance.is_empty() {
            println!("    Compliance   {}", rule.compliance.join(", ").bright_cyan());
        }
    } else {
        println!("{}", rule.id);
        println!("    Name         {}", rule.name);
        println!("    Description  {}", rule.description);
        println!("    Kind         {}", kind_label(rule.kind));
        if !rule.compliance.is_empty() {
            println!("    Compliance   {}", rule.compliance.join(", "));
        }
    }
    Ok(())
}
