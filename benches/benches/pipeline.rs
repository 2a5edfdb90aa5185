use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use engine::{apply_fixes, FixConfig};
use findings::Scanner;
use loader::{detect_scanner, parse_findings};
use rules::RuleTable;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn bandit_scan(records: usize) -> Value {
    let results: Vec<Value> = (0..records)
        .map(|i| {
            json!({
                "filename": format!("src/mod_{:02}.py", i % 40),
                "line_number": i % 30 + 2,
                "test_id": (["B303", "B104", "B999"][i % 3]),
                "issue_severity": "MEDIUM",
                "issue_text": "Use of insecure MD5 hash function."
            })
        })
        .collect();
    json!({ "results": results })
}

fn bandit_doc() -> Value {
    bandit_scan(500)
}

fn checkov_doc() -> Value {
    let failed: Vec<Value> = (0..500)
        .map(|i| {
            json!({
                "check_id": format!("CKV_AWS_{}", i % 60),
                "check_name": "Ensure the resource is hardened",
                "file_path": format!("/stacks/stack_{}.tf", i % 20),
                "file_line_range": [i % 80 + 1, i % 80 + 6],
                "resource": format!("aws_s3_bucket.data_{}", i % 20),
                "severity": "MEDIUM"
            })
        })
        .collect();
    json!({"check_type": "terraform", "results": {"failed_checks": failed}})
}

fn opa_doc() -> Value {
    let violations: Vec<Value> = (0..500)
        .map(|i| {
            json!({
                "policy": "privileged-containers-disallowed",
                "message": "Container runs privileged",
                "severity": "HIGH",
                "file": format!("manifests/deploy_{}.yaml", i % 20),
                "resource": {"name": format!("web-{}", i % 20)}
            })
        })
        .collect();
    json!({"results": {"opa": {"violations": violations}}})
}

fn trivy_doc() -> Value {
    let vulns: Vec<Value> = (0..500)
        .map(|i| {
            json!({
                "VulnerabilityID": format!("CVE-2024-{:04}", i),
                "PkgName": "openssl",
                "Severity": "HIGH",
                "Title": "Buffer overflow"
            })
        })
        .collect();
    json!({"Results": [{"Target": "Cargo.lock", "Vulnerabilities": vulns}]})
}

struct ScannerBench {
    name: &'static str,
    scanner: Scanner,
    doc: fn() -> Value,
}

const SCANNER_BENCHES: &[ScannerBench] = &[
    ScannerBench {
        name: "parse_bandit",
        scanner: Scanner::Bandit,
        doc: bandit_doc,
    },
    ScannerBench {
        name: "parse_checkov",
        scanner: Scanner::Checkov,
        doc: checkov_doc,
    },
    ScannerBench {
        name: "parse_opa",
        scanner: Scanner::Opa,
        doc: opa_doc,
    },
    ScannerBench {
        name: "parse_trivy",
        scanner: Scanner::Trivy,
        doc: trivy_doc,
    },
];

fn bench_parsing(c: &mut Criterion) {
    for bench in SCANNER_BENCHES {
        let doc = (bench.doc)();
        c.bench_function(bench.name, |b| {
            b.iter(|| parse_findings(black_box(&doc), bench.scanner))
        });
    }
}

fn bench_detection(c: &mut Criterion) {
    let docs: Vec<Value> = SCANNER_BENCHES.iter().map(|b| (b.doc)()).collect();
    c.bench_function("detect_scanner", |b| {
        b.iter(|| {
            docs.iter()
                .filter(|doc| detect_scanner(black_box(doc)).is_some())
                .count()
        })
    });
}

fn bench_rule_lookup(c: &mut Criterion) {
    let loaded = parse_findings(&bandit_scan(500), Scanner::Bandit);
    let table = RuleTable::builtin();
    c.bench_function("rule_lookup", |b| {
        b.iter(|| {
            loaded
                .findings
                .iter()
                .filter(|f| table.lookup(black_box(f)).is_some())
                .count()
        })
    });
}

/// Python tree matching the synthetic bandit scan: 40 modules, an md5
/// call on every flagged line.
fn synthetic_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir(&src).expect("create src");
    let body = format!("import hashlib\n{}", "h = hashlib.md5(x)\n".repeat(31));
    for i in 0..40 {
        fs::write(src.join(format!("mod_{i:02}.py")), &body).expect("write module");
    }
    dir
}

fn bench_apply(c: &mut Criterion) {
    let table = RuleTable::builtin();
    let loaded = parse_findings(&bandit_scan(200), Scanner::Bandit);
    c.bench_function("apply_fixes", |b| {
        b.iter_batched(
            synthetic_project,
            |dir| {
                let config = FixConfig {
                    project_root: dir.path().to_path_buf(),
                    dry_run: false,
                    backups: false,
                };
                apply_fixes(black_box(loaded.findings.clone()), &table, &config)
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(
    benches,
    bench_parsing,
    bench_detection,
    bench_rule_lookup,
    bench_apply
);
criterion_main!(benches);
