#![no_main]
use findings::{Finding, Scanner, Severity};
use libfuzzer_sys::fuzz_target;
use rules::{FixKind, RuleTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(mut doc) = serde_yaml::from_str::<serde_yaml::Value>(s) {
            let finding = Finding::new(
                Scanner::Opa,
                "fuzz-policy",
                Some("fuzz.yaml".into()),
                None,
                Severity::Medium,
                "fuzz",
            );
            for rule in RuleTable::builtin().iter() {
                if let FixKind::YamlDoc(fix) = rule.kind {
                    let _ = fix(&mut doc, &finding);
                }
            }
        }
    }
});
