//! Fix rules for Bandit findings in Python sources, text mode.
//!
//! Strict fixes fail when the flagged line no longer shows the insecure
//! pattern, which keeps a second run from touching already-fixed code.
//! Guarded fixes return the content unchanged instead. B104 has neither
//! guard nor anchor and inserts its comment again on every run.

use crate::edit;
use crate::{FixKind, FixRule};
use anyhow::bail;
use findings::Finding;
use regex::Regex;

pub(crate) static TABLE: &[FixRule] = &[
    FixRule {
        id: "B104",
        name: "Flag bind to all interfaces",
        description: "Inserts a review comment above a socket bind to 0.0.0.0",
        kind: FixKind::Text(bind_all_interfaces),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "B105",
        name: "Move hardcoded password to environment",
        description: "Replaces a hardcoded password string with an os.environ lookup",
        kind: FixKind::Text(hardcoded_password),
        compliance: &["SOC2-CC6.1", "PCI-DSS-8.2"],
    },
    FixRule {
        id: "B106",
        name: "Move hardcoded password argument to environment",
        description: "Replaces a hardcoded password string with an os.environ lookup",
        kind: FixKind::Text(hardcoded_password),
        compliance: &["SOC2-CC6.1", "PCI-DSS-8.2"],
    },
    FixRule {
        id: "B113",
        name: "Add request timeout",
        description: "Adds timeout=30 to a requests call without one",
        kind: FixKind::Text(request_without_timeout),
        compliance: &["SOC2-CC7.1"],
    },
    FixRule {
        id: "B201",
        name: "Disable Flask debug mode",
        description: "Turns debug=True into debug=False on the flagged line",
        kind: FixKind::Text(flask_debug),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "B303",
        name: "Replace insecure hash",
        description: "Rewrites hashlib.md5/hashlib.sha1 calls to hashlib.sha256",
        kind: FixKind::Text(insecure_hash),
        compliance: &["SOC2-CC6.1"],
    },
    FixRule {
        id: "B324",
        name: "Replace insecure hash function",
        description: "Rewrites hashlib.md5/hashlib.sha1 calls to hashlib.sha256",
        kind: FixKind::Text(insecure_hash),
        compliance: &["SOC2-CC6.1"],
    },
    FixRule {
        id: "B501",
        name: "Enable certificate verification",
        description: "Turns verify=False into verify=True on the flagged line",
        kind: FixKind::Text(no_cert_verification),
        compliance: &["SOC2-CC6.7"],
    },
    FixRule {
        id: "B506",
        name: "Use yaml.safe_load",
        description: "Rewrites yaml.load calls to yaml.safe_load",
        kind: FixKind::Text(unsafe_yaml_load),
        compliance: &["SOC2-CC6.1"],
    },
    FixRule {
        id: "B602",
        name: "Disable shell in subprocess",
        description: "Turns shell=True into shell=False on the flagged line",
        kind: FixKind::Text(subprocess_shell),
        compliance: &["SOC2-CC6.8"],
    },
];

fn bind_all_interfaces(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_above(content, finding.line, |flagged| {
        format!(
            "{}# SECURITY: binds all interfaces; restrict to a specific address",
            edit::indent_of(flagged)
        )
    })
}

fn hardcoded_password(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::edit_line(content, finding.line, |line| {
        if line.contains("os.environ") {
            return Ok(line.to_string());
        }
        let assign = Regex::new(
            r#"^(?P<head>\s*(?:[A-Za-z_][A-Za-z0-9_.]*\.)?(?P<var>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*)("[^"]*"|'[^']*')(?P<tail>.*)$"#,
        )
        .expect("valid assignment regex");
        let Some(caps) = assign.captures(line) else {
            bail!("no string assignment on the flagged line");
        };
        let head = &caps["head"];
        let var = caps["var"].to_uppercase();
        let tail = &caps["tail"];
        Ok(format!(r#"{head}os.environ.get("{var}", ""){tail}"#))
    })
}

fn request_without_timeout(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::edit_line(content, finding.line, |line| {
        if line.contains("timeout=") {
            return Ok(line.to_string());
        }
        let call = Regex::new(
            r"(?P<call>requests\.(?:get|post|put|patch|delete|head|options|request)\s*\()(?P<args>[^)]*)\)",
        )
        .expect("valid requests call regex");
        let mut replaced = false;
        let out = call.replace(line, |caps: &regex::Captures| {
            replaced = true;
            if caps["args"].trim().is_empty() {
                format!("{}timeout=30)", &caps["call"])
            } else {
                format!("{}{}, timeout=30)", &caps["call"], &caps["args"])
            }
        });
        if !replaced {
            bail!("no requests call on the flagged line");
        }
        Ok(out.into_owned())
    })
}

fn flask_debug(content: &str, finding: &Finding) -> anyhow::Result<String> {
    replace_on_line(content, finding, "debug=True", "debug=False")
}

fn insecure_hash(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::edit_line(content, finding.line, |line| {
        if line.contains("hashlib.md5") {
            Ok(line.replace("hashlib.md5", "hashlib.sha256"))
        } else if line.contains("hashlib.sha1") {
            Ok(line.replace("hashlib.sha1", "hashlib.sha256"))
        } else {
            bail!("no insecure hash call on the flagged line")
        }
    })
}

fn no_cert_verification(content: &str, finding: &Finding) -> anyhow::Result<String> {
    replace_on_line(content, finding, "verify=False", "verify=True")
}

fn unsafe_yaml_load(content: &str, finding: &Finding) -> anyhow::Result<String> {
    replace_on_line(content, finding, "yaml.load(", "yaml.safe_load(")
}

fn subprocess_shell(content: &str, finding: &Finding) -> anyhow::Result<String> {
    replace_on_line(content, finding, "shell=True", "shell=False")
}

fn replace_on_line(
    content: &str,
    finding: &Finding,
    from: &str,
    to: &str,
) -> anyhow::Result<String> {
    edit::edit_line(content, finding.line, |line| {
        if !line.contains(from) {
            bail!("`{from}` not found on the flagged line");
        }
        Ok(line.replace(from, to))
    })
}
