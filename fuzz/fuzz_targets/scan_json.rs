#![no_main]
use findings::Scanner;
use libfuzzer_sys::fuzz_target;
use loader::{detect_scanner, parse_findings};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = serde_json::from_str::<serde_json::Value>(s) {
            let _ = detect_scanner(&doc);
            for scanner in Scanner::ALL {
                let _ = parse_findings(&doc, scanner);
            }
        }
    }
});
