//! Line-oriented text edits shared by the text-mode fix functions.
//!
//! All helpers treat line numbers as 1-based, the way scanners report
//! them, and fail with `invalid location` when a flagged line is out of
//! range.

use anyhow::{bail, Context};
use findings::Finding;
use regex::Regex;

fn line_count(lines: &[&str], content: &str) -> usize {
    // split('\n') yields one empty trailing element for a final newline
    if content.ends_with('\n') {
        lines.len() - 1
    } else {
        lines.len()
    }
}

/// Leading whitespace of a line.
pub(crate) fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Applies `f` to the flagged line and reassembles the file.
pub(crate) fn edit_line(
    content: &str,
    line: Option<usize>,
    f: impl FnOnce(&str) -> anyhow::Result<String>,
) -> anyhow::Result<String> {
    let line = line.context("finding has no line number")?;
    let lines: Vec<&str> = content.split('\n').collect();
    if line == 0 || line > line_count(&lines, content) {
        bail!("invalid location");
    }
    let fixed = f(lines[line - 1])?;
    let mut out = String::with_capacity(content.len() + fixed.len());
    for (idx, l) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        if idx == line - 1 {
            out.push_str(&fixed);
        } else {
            out.push_str(l);
        }
    }
    Ok(out)
}

/// Inserts one new line directly above the flagged line. `make` receives
/// the flagged line so the insertion can copy its indentation.
pub(crate) fn insert_above(
    content: &str,
    line: Option<usize>,
    make: impl FnOnce(&str) -> String,
) -> anyhow::Result<String> {
    let line = line.context("finding has no line number")?;
    let lines: Vec<&str> = content.split('\n').collect();
    if line == 0 || line > line_count(&lines, content) {
        bail!("invalid location");
    }
    let inserted = make(lines[line - 1]);
    let mut out = String::with_capacity(content.len() + inserted.len() + 1);
    for (idx, l) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        if idx == line - 1 {
            out.push_str(&inserted);
            out.push('\n');
        }
        out.push_str(l);
    }
    Ok(out)
}

/// Extent of one Terraform block inside a file, 0-based line indices.
#[derive(Debug)]
pub(crate) struct TfBlock {
    pub open: usize,
    pub end: usize,
    pub body_indent: String,
}

/// Locates the block a finding points at: by the `type.name` resource
/// address when the finding carries one, falling back to the flagged
/// line. Brace counting ignores string context; these fixes are textual
/// substitution, same as the attribute edits built on top.
pub(crate) fn find_tf_block(content: &str, finding: &Finding) -> anyhow::Result<TfBlock> {
    let lines: Vec<&str> = content.split('\n').collect();
    let open = match finding
        .resource
        .as_deref()
        .and_then(|addr| find_resource_line(&lines, addr))
    {
        Some(idx) => idx,
        None => {
            let line = finding
                .line
                .context("finding has neither resource nor line")?;
            if line == 0 || line > line_count(&lines, content) {
                bail!("invalid location");
            }
            if !lines[line - 1].contains('{') {
                bail!("resource block not found");
            }
            line - 1
        }
    };
    let mut depth = 0i64;
    for (idx, l) in lines.iter().enumerate().skip(open) {
        depth += l.matches('{').count() as i64;
        depth -= l.matches('}').count() as i64;
        if depth <= 0 {
            let indent = indent_of(lines[open]);
            return Ok(TfBlock {
                open,
                end: idx,
                body_indent: format!("{indent}  "),
            });
        }
    }
    bail!("resource block not closed");
}

fn find_resource_line(lines: &[&str], address: &str) -> Option<usize> {
    // `module.app.aws_s3_bucket.data` and `aws_s3_bucket.data` both name
    // the same declaration; the last two segments are type and name.
    let mut parts = address.rsplit('.');
    let name = parts.next()?;
    let rtype = parts.next()?;
    let header = Regex::new(&format!(
        r#"^\s*(?:resource|data)\s+"{}"\s+"{}"\s*\{{"#,
        regex::escape(rtype),
        regex::escape(name)
    ))
    .expect("valid resource header regex");
    lines.iter().position(|l| header.is_match(l))
}

/// Inserts `snippet` lines just under the block's opening brace, indented
/// one level in, unless `guard` already appears inside the block.
pub(crate) fn insert_into_tf_block(
    content: &str,
    finding: &Finding,
    snippet: &[&str],
    guard: &str,
) -> anyhow::Result<String> {
    let block = find_tf_block(content, finding)?;
    let lines: Vec<&str> = content.split('\n').collect();
    if lines[block.open..=block.end]
        .iter()
        .any(|l| l.contains(guard))
    {
        return Ok(content.to_string());
    }
    let mut out = String::with_capacity(content.len() + 64);
    for (idx, l) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(l);
        if idx == block.open {
            for s in snippet {
                out.push('\n');
                if !s.is_empty() {
                    out.push_str(&block.body_indent);
                    out.push_str(s);
                }
            }
        }
    }
    Ok(out)
}

/// Sets `key = value` inside the block: rewrites the attribute's line
/// when it is already declared, inserts it under the opening brace
/// otherwise. Rewriting to the value already present returns the content
/// unchanged.
pub(crate) fn set_tf_attribute(
    content: &str,
    finding: &Finding,
    key: &str,
    value: &str,
) -> anyhow::Result<String> {
    let block = find_tf_block(content, finding)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let attr = Regex::new(&format!(r"^(\s*){}\s*=", regex::escape(key)))
        .expect("valid attribute regex");
    for idx in block.open + 1..block.end {
        if let Some(caps) = attr.captures(lines[idx]) {
            let indent = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let replacement = format!("{indent}{key} = {value}");
            if lines[idx] == replacement {
                return Ok(content.to_string());
            }
            let mut out: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
            out[idx] = replacement;
            return Ok(out.join("\n"));
        }
    }
    let mut out = String::with_capacity(content.len() + key.len() + value.len() + 8);
    for (idx, l) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(l);
        if idx == block.open {
            out.push('\n');
            out.push_str(&block.body_indent);
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
        }
    }
    Ok(out)
}
