//! Conversion of findings to SARIF 2.1.0 specification.

use findings::{Finding, Severity};
use serde_sarif::sarif;

pub fn to_sarif(findings: &[Finding]) -> sarif::Sarif {
    let results: Vec<sarif::Result> = findings
        .iter()
        .map(|f| {
            let uri = f
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let location = sarif::Location::builder()
                .physical_location(
                    sarif::PhysicalLocation::builder()
                        .artifact_location(sarif::ArtifactLocation::builder().uri(uri).build())
                        .region(
                            sarif::Region::builder()
                                // SARIF requires a 1-based line
                                .start_line(f.line.unwrap_or(1) as i64)
                                .build(),
                        )
                        .build(),
                )
                .build();

            let level = match f.severity {
                Severity::Low => sarif::ResultLevel::Note,
                Severity::Medium => sarif::ResultLevel::Warning,
                Severity::High => sarif::ResultLevel::Error,
                Severity::Critical => sarif::ResultLevel::Error,
            };

            sarif::Result::builder()
                .rule_id(f.rule_id.clone())
                .message(sarif::Message::builder().text(f.message.clone()).build())
                .level(level)
                .locations(vec![location])
                .build()
        })
        .collect();

    sarif::Sarif::builder()
        .version(serde_json::json!("2.1.0"))
        .schema(sarif::SCHEMA_URL.to_string())
        .runs(vec![sarif::Run::builder()
            .tool(
                sarif::Tool::builder()
                    // Remedium is the tool name emitted in SARIF reports.
                    .driver(sarif::ToolComponent::builder().name("Remedium").build())
                    .build(),
            )
            .results(results)
            .build()])
        .build()
}
