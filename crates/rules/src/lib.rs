//! Built-in fix rules and their lookup table.
//!
//! A [`FixRule`] binds a scanner check to a fix function. Bandit and
//! Checkov rules are keyed by the scanner's own stable identifier; OPA
//! policy names are free text and go through the keyword matcher in
//! [`opa::match_policy`] first. Tables are static and shared read-only
//! across a whole run.

use findings::{Finding, Scanner};
use serde_yaml::Value as YamlValue;
use std::collections::HashMap;

mod bandit;
mod checkov;
mod edit;
mod opa;

pub use opa::match_policy;

/// Rewrites a whole file's text content.
pub type TextFix = fn(&str, &Finding) -> anyhow::Result<String>;

/// Mutates one parsed YAML document; returns whether it changed.
pub type YamlFix = fn(&mut YamlValue, &Finding) -> anyhow::Result<bool>;

/// How a rule applies its fix.
#[derive(Debug, Clone, Copy)]
pub enum FixKind {
    Text(TextFix),
    YamlDoc(YamlFix),
}

#[derive(Debug)]
/// One registered fix: what it remediates, how, and which compliance
/// controls the remediation satisfies.
pub struct FixRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FixKind,
    pub compliance: &'static [&'static str],
}

/// All registered fix rules, indexed for lookup.
///
/// Covers a deliberately small slice of each scanner's checks; most
/// real-world findings have no fix here and are reported as skipped.
pub struct RuleTable {
    by_id: HashMap<&'static str, &'static FixRule>,
    ordered: Vec<&'static FixRule>,
}

impl RuleTable {
    /// Builds the table from the built-in bandit, checkov and OPA rules.
    pub fn builtin() -> Self {
        let mut by_id = HashMap::new();
        let mut ordered = Vec::new();
        for rule in bandit::TABLE
            .iter()
            .chain(checkov::TABLE)
            .chain(opa::TABLE)
        {
            by_id.insert(rule.id, rule);
            ordered.push(rule);
        }
        RuleTable { by_id, ordered }
    }

    /// Resolves the fix rule for a finding, if one is registered.
    ///
    /// OPA findings carry a free-text policy name instead of a stable id,
    /// so they resolve through the ordered keyword matcher.
    pub fn lookup(&self, finding: &Finding) -> Option<&'static FixRule> {
        let key = match finding.scanner {
            Scanner::Opa => opa::match_policy(&finding.rule_id)?,
            _ => finding.rule_id.as_str(),
        };
        self.by_id.get(key).copied()
    }

    /// Looks a rule up by its registered id.
    pub fn get(&self, id: &str) -> Option<&'static FixRule> {
        self.by_id.get(id).copied()
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static FixRule> + '_ {
        self.ordered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
