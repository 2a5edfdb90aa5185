//! Fix rules for Checkov findings in Terraform files, text mode.
//!
//! Every fix is scoped to the resource block the finding names, located
//! by its `type.name` address. Attribute fixes rewrite an existing
//! declaration or insert one; block fixes are guarded by a substring
//! check so a second run leaves the file alone.

use crate::edit;
use crate::{FixKind, FixRule};
use findings::Finding;

pub(crate) static TABLE: &[FixRule] = &[
    FixRule {
        id: "CKV_AWS_16",
        name: "Encrypt RDS storage",
        description: "Sets storage_encrypted = true on the database instance",
        kind: FixKind::Text(rds_encryption),
        compliance: &["SOC2-CC6.1", "SOC2-CC6.7"],
    },
    FixRule {
        id: "CKV_AWS_17",
        name: "Block public RDS access",
        description: "Sets publicly_accessible = false on the database instance",
        kind: FixKind::Text(rds_public_access),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "CKV_AWS_18",
        name: "Enable S3 access logging",
        description: "Adds a logging block to the bucket",
        kind: FixKind::Text(s3_access_logging),
        compliance: &["SOC2-CC7.2"],
    },
    FixRule {
        id: "CKV_AWS_19",
        name: "Encrypt S3 bucket",
        description: "Adds a server-side encryption configuration to the bucket",
        kind: FixKind::Text(s3_encryption),
        compliance: &["SOC2-CC6.1", "SOC2-CC6.7"],
    },
    FixRule {
        id: "CKV_AWS_20",
        name: "Make S3 ACL private",
        description: "Sets the bucket ACL to private",
        kind: FixKind::Text(s3_private_acl),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "CKV_AWS_21",
        name: "Enable S3 versioning",
        description: "Adds a versioning block to the bucket",
        kind: FixKind::Text(s3_versioning),
        compliance: &["SOC2-CC8.1"],
    },
    FixRule {
        id: "CKV_AWS_23",
        name: "Describe security group rule",
        description: "Adds a description to the security group rule",
        kind: FixKind::Text(sg_rule_description),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "CKV_AWS_79",
        name: "Require IMDSv2",
        description: "Adds metadata_options requiring session tokens to the instance",
        kind: FixKind::Text(imdsv2),
        compliance: &["SOC2-CC6.6"],
    },
    FixRule {
        id: "CKV_AWS_126",
        name: "Enable detailed monitoring",
        description: "Sets monitoring = true on the instance",
        kind: FixKind::Text(detailed_monitoring),
        compliance: &["SOC2-CC7.2"],
    },
];

fn rds_encryption(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::set_tf_attribute(content, finding, "storage_encrypted", "true")
}

fn rds_public_access(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::set_tf_attribute(content, finding, "publicly_accessible", "false")
}

fn s3_access_logging(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_into_tf_block(
        content,
        finding,
        &[
            "logging {",
            "  target_bucket = \"my-access-logs\" # point at your logging bucket",
            "  target_prefix = \"log/\"",
            "}",
        ],
        "logging",
    )
}

fn s3_encryption(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_into_tf_block(
        content,
        finding,
        &[
            "server_side_encryption_configuration {",
            "  rule {",
            "    apply_server_side_encryption_by_default {",
            "      sse_algorithm = \"aws:kms\"",
            "    }",
            "  }",
            "}",
        ],
        "server_side_encryption_configuration",
    )
}

fn s3_private_acl(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::set_tf_attribute(content, finding, "acl", "\"private\"")
}

fn s3_versioning(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_into_tf_block(
        content,
        finding,
        &["versioning {", "  enabled = true", "}"],
        "versioning",
    )
}

fn sg_rule_description(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_into_tf_block(
        content,
        finding,
        &["description = \"Managed security group rule\""],
        "description",
    )
}

fn imdsv2(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::insert_into_tf_block(
        content,
        finding,
        &[
            "metadata_options {",
            "  http_endpoint = \"enabled\"",
            "  http_tokens   = \"required\"",
            "}",
        ],
        "metadata_options",
    )
}

fn detailed_monitoring(content: &str, finding: &Finding) -> anyhow::Result<String> {
    edit::set_tf_attribute(content, finding, "monitoring", "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use findings::{Scanner, Severity};
    use std::path::PathBuf;

    fn finding(rule_id: &str, resource: &str) -> Finding {
        let mut f = Finding::new(
            Scanner::Checkov,
            rule_id,
            Some(PathBuf::from("main.tf")),
            Some(1),
            Severity::Medium,
            "test",
        );
        f.resource = Some(resource.to_string());
        f
    }

    const BUCKET: &str = r#"resource "aws_s3_bucket" "data" {
  bucket = "company-data"
  acl    = "public-read"
}
"#;

    const DB: &str = r#"resource "aws_db_instance" "default" {
  engine              = "postgres"
  publicly_accessible = true
}
"#;

    #[test]
    fn public_acl_becomes_private() {
        let fixed = s3_private_acl(BUCKET, &finding("CKV_AWS_20", "aws_s3_bucket.data")).unwrap();
        assert!(fixed.contains("acl = \"private\""));
        assert!(!fixed.contains("public-read"));
    }

    #[test]
    fn versioning_block_is_inserted_and_guarded() {
        let f = finding("CKV_AWS_21", "aws_s3_bucket.data");
        let fixed = s3_versioning(BUCKET, &f).unwrap();
        assert!(fixed.contains("  versioning {\n    enabled = true\n  }"));
        let again = s3_versioning(&fixed, &f).unwrap();
        assert_eq!(again, fixed, "guard must keep the second run from inserting twice");
    }

    #[test]
    fn encryption_configuration_is_nested_correctly() {
        let fixed = s3_encryption(BUCKET, &finding("CKV_AWS_19", "aws_s3_bucket.data")).unwrap();
        assert!(fixed.contains("  server_side_encryption_configuration {"));
        assert!(fixed.contains("        sse_algorithm = \"aws:kms\""));
    }

    #[test]
    fn rds_flags_are_rewritten_in_place() {
        let f = finding("CKV_AWS_17", "aws_db_instance.default");
        let fixed = rds_public_access(DB, &f).unwrap();
        assert!(fixed.contains("publicly_accessible = false"));
        assert!(!fixed.contains("publicly_accessible = true"));
        let f = finding("CKV_AWS_16", "aws_db_instance.default");
        let fixed = rds_encryption(&fixed, &f).unwrap();
        assert!(fixed.contains("storage_encrypted = true"));
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let mut f = finding("CKV_AWS_21", "aws_s3_bucket.missing");
        f.line = None;
        let err = s3_versioning(BUCKET, &f).unwrap_err();
        assert!(err.to_string().contains("resource"));
    }

    #[test]
    fn imdsv2_block_lands_in_the_instance() {
        let tf = "resource \"aws_instance\" \"web\" {\n  ami = \"ami-123\"\n}\n";
        let fixed = imdsv2(tf, &finding("CKV_AWS_79", "aws_instance.web")).unwrap();
        assert!(fixed.contains("  metadata_options {\n    http_endpoint = \"enabled\"\n    http_tokens   = \"required\"\n  }"));
    }
}
