//! Rendering a [`Node`] tree as YAML or JSON text.

use crate::{Node, Result, ScalarType};

const INDENT: usize = 2;

/// Render a tree as block-style YAML.
///
/// Head comments are written above their keys and line comments after the
/// value (or after the key, for container values). Scalars are written
/// plain when that reads back as the same type, double-quoted otherwise.
pub fn emit_yaml(node: &Node) -> String {
    let mut out = String::new();
    if node.is_mapping() && !node.is_empty() {
        write_mapping(&mut out, node, 0);
    } else if node.is_sequence() && !node.is_empty() {
        write_sequence(&mut out, node, 0);
    } else {
        out.push_str(&inline_value(node));
        out.push_str(&line_comment(node));
        out.push('\n');
    }
    out
}

/// Render a tree as pretty-printed JSON, with a trailing newline.
pub fn emit_json(node: &Node) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&node.to_json_value())?;
    text.push('\n');
    Ok(text)
}

fn write_mapping(out: &mut String, node: &Node, indent: usize) {
    let pad = " ".repeat(indent);
    for entry in node.entries() {
        for comment in entry.key.head_comment.lines() {
            out.push_str(&pad);
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(&render_scalar(&entry.key));
        out.push(':');

        let value = &entry.value;
        if value.is_scalar() || value.is_empty() {
            out.push(' ');
            out.push_str(&inline_value(value));
            let comment = if value.line_comment.is_empty() {
                &entry.key
            } else {
                value
            };
            out.push_str(&line_comment(comment));
            out.push('\n');
            continue;
        }

        out.push_str(&line_comment(&entry.key));
        out.push('\n');
        if value.is_mapping() {
            write_mapping(out, value, indent + INDENT);
        } else {
            write_sequence(out, value, indent + INDENT);
        }
    }
}

fn write_sequence(out: &mut String, node: &Node, indent: usize) {
    let pad = " ".repeat(indent);
    for item in node.elements() {
        if item.is_scalar() || item.is_empty() {
            out.push_str(&pad);
            out.push_str("- ");
            out.push_str(&inline_value(item));
            out.push_str(&line_comment(item));
            out.push('\n');
            continue;
        }

        let mut nested = String::new();
        if item.is_mapping() {
            write_mapping(&mut nested, item, indent + INDENT);
        } else {
            write_sequence(&mut nested, item, indent + INDENT);
        }

        let starts_with_comment = item
            .entries()
            .first()
            .is_some_and(|entry| !entry.key.head_comment.is_empty());
        if starts_with_comment {
            out.push_str(&pad);
            out.push_str("-\n");
            out.push_str(&nested);
        } else {
            // the first nested line becomes the item line
            out.push_str(&pad);
            out.push_str("- ");
            out.push_str(&nested[indent + INDENT..]);
        }
    }
}

fn line_comment(node: &Node) -> String {
    let comment = node.line_comment.trim_start();
    if comment.is_empty() {
        String::new()
    } else {
        format!(" # {comment}")
    }
}

fn inline_value(node: &Node) -> String {
    if node.is_mapping() {
        "{}".to_string()
    } else if node.is_sequence() {
        "[]".to_string()
    } else {
        render_scalar(node)
    }
}

fn render_scalar(node: &Node) -> String {
    let text = node.value();
    let Some(ty) = node.scalar_type() else {
        return String::new();
    };
    let plain_type = ScalarType::resolve_plain(text);

    if ty == ScalarType::Str {
        if is_plain_safe(text) && plain_type == ScalarType::Str {
            return text.to_string();
        }
        return double_quote(text);
    }
    if plain_type == ty && is_plain_safe(text) {
        return text.to_string();
    }
    if ty == ScalarType::Null {
        return "null".to_string();
    }
    format!("!!{} {}", ty, double_quote(text))
}

fn is_plain_safe(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if text.trim() != text || text.starts_with("---") || text.starts_with("...") {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        let starts_value = matches!(first, '-' | '?' | ':')
            && text.chars().nth(1).is_some_and(|c| !c.is_whitespace());
        if !starts_value {
            return false;
        }
    }
    !(text.contains(": ")
        || text.contains(" #")
        || text.ends_with(':')
        || text.chars().any(char::is_control))
}

fn double_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
