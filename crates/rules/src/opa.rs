//! Fix rules for OPA policy violations on Kubernetes manifests,
//! structured mode.
//!
//! OPA findings carry a free-text policy name instead of a stable rule
//! id, so [`match_policy`] classifies names through an ordered keyword
//! table before table lookup. The fixes mutate parsed YAML documents;
//! re-serialization drops comments and reflows formatting.

use crate::{FixKind, FixRule};
use findings::Finding;
use serde_yaml::{Mapping, Value as YamlValue};

/// Keyword rows tried top to bottom; the first row whose keywords all
/// appear in the lowercased policy name wins. A name hitting several
/// rows resolves to the earliest row, not the most specific one.
const POLICY_KEYWORDS: &[(&[&str], &str)] = &[
    (&["privileged"], "k8s-deny-privileged"),
    (&["escalation"], "k8s-no-privilege-escalation"),
    (&["root"], "k8s-run-as-non-root"),
    (&["read-only"], "k8s-read-only-root-fs"),
    (&["capabilities"], "k8s-drop-capabilities"),
    (&["resource", "limit"], "k8s-resource-limits"),
    (&["label"], "k8s-required-labels"),
    (&["host", "network"], "k8s-host-network"),
    (&["security", "context"], "k8s-security-context"),
];

/// Maps a free-text policy name to a registered rule id.
pub fn match_policy(policy: &str) -> Option<&'static str> {
    let name = policy.to_lowercase();
    POLICY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|k| name.contains(k)))
        .map(|(_, rule_id)| *rule_id)
}

pub(crate) static TABLE: &[FixRule] = &[
    FixRule {
        id: "k8s-deny-privileged",
        name: "Remove privileged mode",
        description: "Sets securityContext.privileged to false on every container",
        kind: FixKind::YamlDoc(deny_privileged),
        compliance: &["SOC2-CC6.6", "CIS-5.2.5"],
    },
    FixRule {
        id: "k8s-no-privilege-escalation",
        name: "Forbid privilege escalation",
        description: "Sets allowPrivilegeEscalation to false on every container",
        kind: FixKind::YamlDoc(no_privilege_escalation),
        compliance: &["SOC2-CC6.6", "CIS-5.2.6"],
    },
    FixRule {
        id: "k8s-run-as-non-root",
        name: "Run as non-root",
        description: "Sets runAsNonRoot to true on every container",
        kind: FixKind::YamlDoc(run_as_non_root),
        compliance: &["SOC2-CC6.6", "CIS-5.2.7"],
    },
    FixRule {
        id: "k8s-read-only-root-fs",
        name: "Read-only root filesystem",
        description: "Sets readOnlyRootFilesystem to true on every container",
        kind: FixKind::YamlDoc(read_only_root_fs),
        compliance: &["SOC2-CC6.8"],
    },
    FixRule {
        id: "k8s-drop-capabilities",
        name: "Drop Linux capabilities",
        description: "Drops ALL capabilities on every container",
        kind: FixKind::YamlDoc(drop_capabilities),
        compliance: &["SOC2-CC6.6", "CIS-5.2.9"],
    },
    FixRule {
        id: "k8s-resource-limits",
        name: "Set resource limits",
        description: "Adds default cpu/memory limits and requests where missing",
        kind: FixKind::YamlDoc(resource_limits),
        compliance: &["SOC2-CC7.1"],
    },
    FixRule {
        id: "k8s-required-labels",
        name: "Add required labels",
        description: "Adds an app label named after the resource when missing",
        kind: FixKind::YamlDoc(required_labels),
        compliance: &["SOC2-CC8.1"],
    },
    FixRule {
        id: "k8s-host-network",
        name: "Disable host network",
        description: "Turns hostNetwork off on the pod spec",
        kind: FixKind::YamlDoc(host_network),
        compliance: &["SOC2-CC6.6", "CIS-5.2.4"],
    },
    FixRule {
        id: "k8s-security-context",
        name: "Apply baseline security context",
        description: "Ensures runAsNonRoot and no privilege escalation on every container",
        kind: FixKind::YamlDoc(security_context),
        compliance: &["SOC2-CC6.6"],
    },
];

/// Pod spec of a workload document: `spec.template.spec` for
/// controllers, `spec` for bare pods.
fn pod_spec_mut(doc: &mut YamlValue) -> Option<&mut YamlValue> {
    let has_template = doc
        .get("spec")
        .and_then(|s| s.get("template"))
        .and_then(|t| t.get("spec"))
        .is_some();
    if has_template {
        return doc.get_mut("spec")?.get_mut("template")?.get_mut("spec");
    }
    if doc.get("spec").is_some() {
        return doc.get_mut("spec");
    }
    None
}

/// Runs `f` over every container and init container mapping, returning
/// whether any call reported a change.
fn for_each_container(doc: &mut YamlValue, mut f: impl FnMut(&mut Mapping) -> bool) -> bool {
    let Some(spec) = pod_spec_mut(doc) else {
        return false;
    };
    let mut changed = false;
    for key in ["containers", "initContainers"] {
        if let Some(YamlValue::Sequence(seq)) = spec.get_mut(key) {
            for container in seq.iter_mut() {
                if let YamlValue::Mapping(map) = container {
                    changed |= f(map);
                }
            }
        }
    }
    changed
}

/// Returns the mapping under `key`, creating it (or replacing a scalar)
/// when necessary.
fn ensure_mapping<'a>(map: &'a mut Mapping, key: &str) -> Option<&'a mut Mapping> {
    let entry = map
        .entry(YamlValue::from(key))
        .or_insert_with(|| YamlValue::Mapping(Mapping::new()));
    if !matches!(entry, YamlValue::Mapping(_)) {
        *entry = YamlValue::Mapping(Mapping::new());
    }
    entry.as_mapping_mut()
}

/// Sets a boolean key, reporting whether the value changed.
fn set_flag(map: &mut Mapping, key: &str, value: bool) -> bool {
    let k = YamlValue::from(key);
    if map.get(&k) == Some(&YamlValue::Bool(value)) {
        return false;
    }
    map.insert(k, YamlValue::Bool(value));
    true
}

fn deny_privileged(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        set_flag(sc, "privileged", false)
    }))
}

fn no_privilege_escalation(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        set_flag(sc, "allowPrivilegeEscalation", false)
    }))
}

fn run_as_non_root(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        set_flag(sc, "runAsNonRoot", true)
    }))
}

fn read_only_root_fs(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        set_flag(sc, "readOnlyRootFilesystem", true)
    }))
}

fn drop_capabilities(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        let Some(caps) = ensure_mapping(sc, "capabilities") else {
            return false;
        };
        let key = YamlValue::from("drop");
        if let Some(YamlValue::Sequence(drop)) = caps.get(&key) {
            if drop.iter().any(|v| v.as_str() == Some("ALL")) {
                return false;
            }
        }
        caps.insert(key, YamlValue::Sequence(vec![YamlValue::from("ALL")]));
        true
    }))
}

fn resource_limits(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(resources) = ensure_mapping(c, "resources") else {
            return false;
        };
        let mut changed = false;
        for (section, cpu, memory) in [("limits", "500m", "512Mi"), ("requests", "250m", "256Mi")]
        {
            let key = YamlValue::from(section);
            if !resources.contains_key(&key) {
                let mut entry = Mapping::new();
                entry.insert(YamlValue::from("cpu"), YamlValue::from(cpu));
                entry.insert(YamlValue::from("memory"), YamlValue::from(memory));
                resources.insert(key, YamlValue::Mapping(entry));
                changed = true;
            }
        }
        changed
    }))
}

fn required_labels(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    let name = doc
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("unlabelled")
        .to_string();
    let Some(root) = doc.as_mapping_mut() else {
        return Ok(false);
    };
    let Some(metadata) = ensure_mapping(root, "metadata") else {
        return Ok(false);
    };
    let Some(labels) = ensure_mapping(metadata, "labels") else {
        return Ok(false);
    };
    let key = YamlValue::from("app");
    // already labelled: leave the existing value alone
    if labels.contains_key(&key) {
        return Ok(false);
    }
    labels.insert(key, YamlValue::from(name));
    Ok(true)
}

fn host_network(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    let Some(spec) = pod_spec_mut(doc).and_then(|s| s.as_mapping_mut()) else {
        return Ok(false);
    };
    let key = YamlValue::from("hostNetwork");
    // absent already means the default of false
    match spec.get(&key) {
        Some(YamlValue::Bool(true)) => {
            spec.insert(key, YamlValue::Bool(false));
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn security_context(doc: &mut YamlValue, _finding: &Finding) -> anyhow::Result<bool> {
    Ok(for_each_container(doc, |c| {
        let Some(sc) = ensure_mapping(c, "securityContext") else {
            return false;
        };
        let non_root = set_flag(sc, "runAsNonRoot", true);
        let no_escalation = set_flag(sc, "allowPrivilegeEscalation", false);
        non_root || no_escalation
    }))
}
