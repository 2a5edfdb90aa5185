#![no_main]
use findings::{Finding, Scanner, Severity};
use libfuzzer_sys::fuzz_target;
use rules::{FixKind, RuleTable};

fuzz_target!(|data: &[u8]| {
    if let Some((&line, rest)) = data.split_first() {
        if let Ok(content) = std::str::from_utf8(rest) {
            let finding = Finding::new(
                Scanner::Bandit,
                "fuzz",
                Some("fuzz.py".into()),
                Some(line as usize + 1),
                Severity::Medium,
                "fuzz",
            );
            for rule in RuleTable::builtin().iter() {
                if let FixKind::Text(fix) = rule.kind {
                    let _ = fix(content, &finding);
                }
            }
        }
    }
});
