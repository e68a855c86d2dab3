//! `${NAME}` / `${NAME:default}` expansion in scalar values.

use crate::error::{Error, ErrorKind, Result};
use crate::resolver::VarResolver;
use std::ops::ControlFlow;
use ycompose_yaml::{Node, ScalarStyle, ScalarType, parse};

/// One variable reference found in a scalar.
#[derive(Debug, PartialEq)]
struct Reference<'a> {
    /// Byte offset of the `$`.
    start: usize,
    /// Byte offset just past the closing `}`.
    end: usize,
    name: &'a str,
    default: Option<DefaultValue>,
}

#[derive(Debug, PartialEq)]
struct DefaultValue {
    text: String,
    ty: ScalarType,
}

impl Reference<'_> {
    fn ty(&self) -> ScalarType {
        self.default.as_ref().map_or(ScalarType::Str, |d| d.ty)
    }
}

enum DefaultScan {
    Found { default: DefaultValue, end: usize },
    /// Not a reference; keep scanning from this offset.
    Resume(usize),
    /// Nothing after this point can close a reference.
    Stop,
}

fn scan(text: &str) -> Vec<Reference<'_>> {
    let bytes = text.as_bytes();
    let mut refs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'$') => {
                i += 2;
                continue;
            }
            Some(b'{') => {}
            _ => {
                i += 1;
                continue;
            }
        }

        let start = i;
        let name_start = i + 2;
        let name_end = name_start + name_length(&bytes[name_start..]);
        if name_end == name_start {
            i = name_start;
            continue;
        }
        let name = &text[name_start..name_end];

        // anything between the name and the first `:` or `}` is skipped
        let delimiter = bytes[name_end..]
            .iter()
            .position(|b| matches!(b, b':' | b'}'));
        let Some(offset) = delimiter else {
            break;
        };
        let delimiter = name_end + offset;
        if bytes[delimiter] == b'}' {
            refs.push(Reference {
                start,
                end: delimiter + 1,
                name,
                default: None,
            });
            i = delimiter + 1;
            continue;
        }
        match scan_default(text, delimiter + 1) {
            DefaultScan::Found { default, end } => {
                refs.push(Reference {
                    start,
                    end,
                    name,
                    default: Some(default),
                });
                i = end;
            }
            DefaultScan::Resume(pos) => i = pos,
            DefaultScan::Stop => break,
        }
    }
    refs
}

fn name_length(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    1 + bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'-')
        .count()
}

/// Scan a default starting at `pos` (just after the `:`).
fn scan_default(text: &str, pos: usize) -> DefaultScan {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b'"') {
        return match text[pos..].find('}') {
            Some(offset) => {
                let value = &text[pos..pos + offset];
                DefaultScan::Found {
                    default: DefaultValue {
                        text: value.to_string(),
                        ty: ScalarType::guess(value),
                    },
                    end: pos + offset + 1,
                }
            }
            None => DefaultScan::Stop,
        };
    }

    let body_start = pos + 1;
    let mut value = String::new();
    let mut chars = text[body_start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => {
                let close = body_start + offset;
                return match bytes.get(close + 1) {
                    Some(b'}') => DefaultScan::Found {
                        default: DefaultValue {
                            text: value,
                            ty: ScalarType::Str,
                        },
                        end: close + 2,
                    },
                    Some(_) => DefaultScan::Resume(close + 1),
                    None => DefaultScan::Resume(body_start),
                };
            }
            '\\' => match chars.peek() {
                Some(&(_, next @ ('"' | '\\'))) => {
                    value.push(next);
                    chars.next();
                }
                _ => value.push('\\'),
            },
            c => value.push(c),
        }
    }
    DefaultScan::Resume(body_start)
}

/// Whether `text` must be quoted to survive re-parsing as a string.
fn needs_quoting(text: &str) -> bool {
    text.contains('}')
        || text.contains('"')
        || ScalarType::guess(text) != ScalarType::Str
        || text.chars().any(char::is_whitespace)
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn resolve_reference(reference: &Reference<'_>, resolver: &dyn VarResolver, keep: bool) -> Result<String> {
    match resolver.resolve(reference.name) {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => {}
        Err(e) if e.kind() == ErrorKind::VarNotFound => {}
        Err(e) => return Err(e),
    }
    // an empty default counts as no default unless expressions are kept
    match &reference.default {
        Some(default) if keep || !default.text.is_empty() => Ok(default.text.clone()),
        _ if keep => Ok(String::new()),
        _ => Err(Error::var_not_found(format!("{} not found", reference.name))),
    }
}

/// Expand every variable reference in `text`.
///
/// With `keep` set, references are not substituted; each is rewritten as
/// `${NAME:resolved}` (or `${NAME}` when nothing resolved) so the result
/// still carries live variables with refreshed defaults.
///
/// # Errors
///
/// A reference that resolves to nothing and has no default fails with
/// [`ErrorKind::VarNotFound`] (never in `keep` mode). Resolver errors other
/// than "not found" are returned as is.
pub fn expand(text: &str, resolver: &dyn VarResolver, keep: bool) -> Result<String> {
    let refs = scan(text);
    if refs.is_empty() {
        return Ok(text.to_string());
    }
    let single = refs.len() == 1 && refs[0].start == 0 && refs[0].end == text.len();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for reference in &refs {
        out.push_str(&text[last..reference.start]);
        let resolved = resolve_reference(reference, resolver, keep)?;
        let is_str = reference.ty() == ScalarType::Str;

        if keep {
            if resolved.is_empty() {
                out.push_str(&format!("${{{}}}", reference.name));
            } else if is_str && needs_quoting(&resolved) {
                out.push_str(&format!("${{{}:{}}}", reference.name, quote(&resolved)));
            } else {
                out.push_str(&format!("${{{}:{}}}", reference.name, resolved));
            }
        } else if single && resolved.is_empty() {
            out.push_str("\"\"");
        } else if single && is_str && needs_quoting(&resolved) {
            out.push_str(&quote(&resolved));
        } else {
            out.push_str(&resolved);
        }
        last = reference.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Expand variables in every string scalar value of `node`.
///
/// Mapping keys are left alone. A changed scalar is re-parsed so that a
/// substitution like `10` becomes an integer.
pub(crate) fn expand_tree(node: &mut Node, resolver: &dyn VarResolver, keep: bool) -> Result<()> {
    if node.is_mapping() {
        return node.try_for_each_entry_mut(|_, value| {
            expand_tree(value, resolver, keep)?;
            Ok(ControlFlow::Continue(()))
        });
    }
    if node.is_sequence() {
        return node.try_for_each_element_mut(|_, element| {
            expand_tree(element, resolver, keep)?;
            Ok(ControlFlow::Continue(()))
        });
    }
    if !node.is_string() {
        return Ok(());
    }

    let expanded = expand(node.value(), resolver, keep).map_err(|e| {
        Error::yaml(format!("{}: failed to resolve a variable", node.source_info)).with_cause(e)
    })?;
    if expanded == node.value() {
        return Ok(());
    }

    match parse(&expanded) {
        Ok(parsed) if parsed.is_scalar() => {
            node.set_scalar(parsed.value(), parsed.style, parsed.tag.clone());
        }
        Ok(_) => node.set_scalar(expanded, ScalarStyle::DoubleQuoted, Some("str".to_string())),
        Err(e) => {
            return Err(
                Error::yaml(format!("{}: failed to parse a variable", node.source_info))
                    .with_cause(e),
            );
        }
    }
    Ok(())
}
