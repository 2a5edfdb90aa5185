//! Per-file fix session: read, back up, apply, write back.

use crate::{AppliedFix, FileGroup, FileOutcome, FixConfig, SkippedFix};
use anyhow::{bail, Context};
use findings::Finding;
use rules::{FixKind, FixRule, RuleTable};
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory representation of the file being fixed. Manifest files
/// (`.yaml`/`.yml`) are parsed as a multi-document stream; everything
/// else stays a plain string.
enum Content {
    Text(String),
    Yaml(Vec<YamlValue>),
}

pub(crate) fn run_session(
    group: FileGroup,
    rules: &RuleTable,
    config: &FixConfig,
    stamp: &str,
) -> FileOutcome {
    let FileGroup {
        path,
        mut findings,
        duplicates,
    } = group;
    let mut outcome = FileOutcome {
        path: path.clone(),
        applied: Vec::new(),
        skipped: duplicates,
        backup: None,
        modified: false,
    };

    let original = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Failed to read file");
            skip_all(&mut outcome, &findings, &format!("failed to read file: {e}"));
            return outcome;
        }
    };

    // The backup precedes any mutation; a file that cannot be backed up
    // is left untouched.
    if !config.dry_run && config.backups {
        let backup_path = PathBuf::from(format!("{}.bak.{}", path.display(), stamp));
        if let Err(e) = fs::copy(&path, &backup_path) {
            warn!(file = %path.display(), error = %e, "Failed to write backup");
            skip_all(&mut outcome, &findings, &format!("backup failed: {e}"));
            return outcome;
        }
        debug!(backup = %backup_path.display(), "Backup written");
        outcome.backup = Some(backup_path);
    }

    let mut content = match load_content(&path, &original) {
        Ok(c) => c,
        Err(e) => {
            warn!(file = %path.display(), "Failed to parse file");
            skip_all(&mut outcome, &findings, &format!("{e:#}"));
            return outcome;
        }
    };

    // Descending line order keeps earlier line numbers valid while text
    // is inserted below them; line-less findings run last.
    findings.sort_by(|a, b| b.line.cmp(&a.line));

    for finding in &findings {
        let Some(rule) = rules.lookup(finding) else {
            outcome
                .skipped
                .push(skip(finding, &path, "No fix pattern available"));
            continue;
        };
        match apply_one(&mut content, finding, rule) {
            Ok(changed) => {
                outcome.modified |= changed;
                debug!(file = %path.display(), rule = rule.id, "Fix applied");
                outcome.applied.push(AppliedFix {
                    file: path.clone(),
                    line: finding.line,
                    rule_id: finding.rule_id.clone(),
                    fix: rule.name.to_string(),
                });
            }
            Err(e) => {
                debug!(file = %path.display(), rule = rule.id, reason = %e, "Fix skipped");
                outcome.skipped.push(skip(finding, &path, &e.to_string()));
            }
        }
    }

    if outcome.modified && !config.dry_run {
        match serialize(&content).and_then(|data| {
            fs::write(&path, data)
                .with_context(|| format!("failed to write fixed file: {}", path.display()))
        }) {
            Ok(()) => {
                info!(file = %path.display(), fixes = outcome.applied.len(), "File fixed");
            }
            Err(e) => {
                // fixes were computed but never landed on disk
                warn!(file = %path.display(), error = %e, "Failed to persist fixes");
                outcome.modified = false;
                let reason = e.to_string();
                for fix in outcome.applied.drain(..) {
                    outcome.skipped.push(SkippedFix {
                        file: fix.file,
                        line: fix.line,
                        rule_id: fix.rule_id,
                        reason: reason.clone(),
                    });
                }
            }
        }
    }
    outcome
}

fn load_content(path: &Path, original: &str) -> anyhow::Result<Content> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if !is_yaml {
        return Ok(Content::Text(original.to_string()));
    }
    let mut docs = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(original) {
        let value = YamlValue::deserialize(doc)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))?;
        docs.push(value);
    }
    Ok(Content::Yaml(docs))
}

fn apply_one(content: &mut Content, finding: &Finding, rule: &FixRule) -> anyhow::Result<bool> {
    match (rule.kind, &mut *content) {
        (FixKind::Text(fix), Content::Text(text)) => {
            let fixed = fix(text, finding)?;
            let changed = fixed != *text;
            *text = fixed;
            Ok(changed)
        }
        (FixKind::YamlDoc(fix), Content::Yaml(docs)) => {
            let targets = target_docs(docs, finding);
            if targets.is_empty() {
                bail!("no matching document");
            }
            let mut changed = false;
            for idx in targets {
                changed |= fix(&mut docs[idx], finding)?;
            }
            Ok(changed)
        }
        _ => bail!("fix does not apply to this file type"),
    }
}

/// Documents a fix should run against: the ones named like the finding's
/// resource when that matches, otherwise every document shaped like a
/// workload.
fn target_docs(docs: &[YamlValue], finding: &Finding) -> Vec<usize> {
    if let Some(resource) = finding.resource.as_deref() {
        let named: Vec<usize> = docs
            .iter()
            .enumerate()
            .filter(|(_, d)| {
                d.get("metadata")
                    .and_then(|m| m.get("name"))
                    .and_then(|v| v.as_str())
                    == Some(resource)
            })
            .map(|(i, _)| i)
            .collect();
        if !named.is_empty() {
            return named;
        }
    }
    docs.iter()
        .enumerate()
        .filter(|(_, d)| d.get("kind").is_some() && d.get("spec").is_some())
        .map(|(i, _)| i)
        .collect()
}

fn serialize(content: &Content) -> anyhow::Result<String> {
    match content {
        Content::Text(text) => Ok(text.clone()),
        Content::Yaml(docs) => {
            let mut rendered = Vec::with_capacity(docs.len());
            for doc in docs {
                rendered.push(serde_yaml::to_string(doc)?);
            }
            Ok(rendered.join("---\n"))
        }
    }
}

fn skip(finding: &Finding, path: &Path, reason: &str) -> SkippedFix {
    SkippedFix {
        file: path.to_path_buf(),
        line: finding.line,
        rule_id: finding.rule_id.clone(),
        reason: reason.to_string(),
    }
}

fn skip_all(outcome: &mut FileOutcome, findings: &[Finding], reason: &str) {
    for finding in findings {
        outcome.skipped.push(skip(finding, &outcome.path, reason));
    }
}
