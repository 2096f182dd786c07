//! YAML output for the enriched document and the revise-needs list.
//!
//! Output is block-style YAML with every string value double-quoted. Keys
//! the input carried beyond the known fields are written back in flow style
//! after the known fields.

use std::fmt::Write as _;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{info, instrument};

use markfill_shared::{BookmarkDocument, MarkfillError, Result, ReviseEntry};

/// Render the bookmark tree.
pub fn render_document(document: &BookmarkDocument) -> String {
    if document.0.is_empty() {
        return "[]\n".to_string();
    }

    let mut out = String::new();
    for category in &document.0 {
        let _ = writeln!(out, "- category: {}", quote(&category.category));
        if category.items.is_empty() {
            out.push_str("  items: []\n");
        } else {
            out.push_str("  items:\n");
            for item in &category.items {
                let _ = writeln!(out, "    - name: {}", quote(&item.name));
                let _ = writeln!(out, "      link: {}", quote(&item.link));
                let _ = writeln!(out, "      image: {}", quote(&item.image));
                let _ = writeln!(out, "      description: {}", quote(&item.description));
                write_extra(&mut out, "      ", &item.extra);
            }
        }
        write_extra(&mut out, "  ", &category.extra);
    }
    out
}

/// Render the list of items that still need a description.
pub fn render_revise_list(entries: &[ReviseEntry]) -> String {
    if entries.is_empty() {
        return "[]\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "- name: {}", quote(&entry.name));
        let _ = writeln!(out, "  link: {}", quote(&entry.link));
        let _ = writeln!(out, "  category: {}", quote(&entry.category));
    }
    out
}

#[instrument(skip_all, fields(path = %path.display()))]
pub async fn write_document(path: &Path, document: &BookmarkDocument) -> Result<()> {
    write_file(path, render_document(document)).await?;
    info!(items = document.total_items(), "bookmark document written");
    Ok(())
}

#[instrument(skip_all, fields(path = %path.display()))]
pub async fn write_revise_list(path: &Path, entries: &[ReviseEntry]) -> Result<()> {
    write_file(path, render_revise_list(entries)).await?;
    info!(entries = entries.len(), "revise list written");
    Ok(())
}

async fn write_file(path: &Path, content: String) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| MarkfillError::io(path, e))
}

fn write_extra(out: &mut String, indent: &str, extra: &Mapping) {
    for (key, value) in extra {
        out.push_str(indent);
        write_flow(out, key);
        out.push_str(": ");
        write_flow(out, value);
        out.push('\n');
    }
}

/// Write `value` as a single-line flow node.
fn write_flow(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Sequence(seq) => {
            out.push('[');
            for (i, v) in seq.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(out, v);
            }
            out.push(']');
        }
        Value::Mapping(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(out, k);
                out.push_str(": ");
                write_flow(out, v);
            }
            out.push('}');
        }
        Value::Tagged(tagged) => {
            let _ = write!(out, "{} ", tagged.tag);
            write_flow(out, &tagged.value);
        }
    }
}

/// Double-quote `value` as a YAML scalar.
///
/// Anything outside the YAML printable set, plus the characters a YAML
/// reader folds as line breaks, is written as a `\uXXXX` escape.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{1F}'
            | '\u{7F}'..='\u{9F}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{FEFF}'
            | '\u{FFFE}'
            | '\u{FFFF}'
    )
}
