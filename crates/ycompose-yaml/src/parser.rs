//! YAML parser that builds [`Node`] trees.

use crate::{Error, MappingEntry, Node, Result, ScalarStyle, SourceInfo};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse YAML (or JSON) from a string, producing a [`Node`] tree.
///
/// This parses a single YAML document. If the input contains multiple
/// documents, only the first one is used. An empty input yields an empty
/// mapping.
///
/// # Example
///
/// ```rust
/// use ycompose_yaml::parse;
///
/// let yaml = parse("title: My Document").unwrap();
/// assert!(yaml.is_mapping());
/// ```
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the YAML is invalid.
pub fn parse(content: &str) -> Result<Node> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// Every node of the result is attributed to `filename`.
///
/// # Example
///
/// ```rust
/// use ycompose_yaml::parse_file;
///
/// let yaml = parse_file("title: My Document", "config.yml").unwrap();
/// assert_eq!(yaml.source_info.file, Some("config.yml".into()));
/// ```
pub fn parse_file(content: &str, filename: &str) -> Result<Node> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Node> {
    let lines = LineIndex::new(content);
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(content, &lines, filename);

    if let Err(err) = parser.load(&mut builder, false) {
        let (line, col) = lines.position(err.marker().index());
        return Err(Error::ParseError {
            message: format!("{} at line {} column {}", err.info(), line, col),
            location: Some(SourceInfo::new(filename.map(str::to_string), line, col)),
        });
    }

    builder.result()
}

/// Line start offsets of the source, counted in characters like the
/// scanner's marker index.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        for (i, c) in content.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// 1-based (line, column) of a character index.
    fn position(&self, index: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= index);
        let start = self.starts[line.saturating_sub(1)];
        (line.max(1), index - start + 1)
    }
}

/// Builder that implements MarkedEventReceiver to construct a [`Node`].
struct YamlBuilder<'a> {
    source_lines: Vec<&'a str>,

    lines: &'a LineIndex,

    filename: Option<String>,

    /// Stack of containers being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, copied on every alias
    anchors: HashMap<usize, Node>,

    root: Option<Node>,

    error: Option<Error>,
}

/// A container being constructed during parsing.
enum BuildNode {
    Sequence {
        source_info: SourceInfo,
        anchor_id: usize,
        items: Vec<Node>,
    },

    Mapping {
        source_info: SourceInfo,
        anchor_id: usize,
        entries: Vec<MappingEntry>,
        pending_key: Option<Node>,
    },
}

impl<'a> YamlBuilder<'a> {
    fn new(source: &'a str, lines: &'a LineIndex, filename: Option<&str>) -> Self {
        Self {
            source_lines: source.lines().collect(),
            lines,
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<Node> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self
            .root
            .unwrap_or_else(|| Node::mapping(SourceInfo::new(self.filename.clone(), 1, 1))))
    }

    fn make_source_info(&self, marker: &Marker) -> SourceInfo {
        let (line, col) = self.lines.position(marker.index());
        SourceInfo::new(self.filename.clone(), line, col)
    }

    /// True when the next completed node will be a mapping key.
    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(BuildNode::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_complete(&mut self, node: Node, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push(MappingEntry { key, value: node }),
                None => *pending_key = Some(node),
            },
        }
    }

    /// Whole-line `#` comments directly above a key at the same indentation.
    fn head_comment_for(&self, source_info: &SourceInfo) -> String {
        let line_idx = source_info.line.saturating_sub(1);
        let Some(line) = self.source_lines.get(line_idx) else {
            return String::new();
        };
        let indent = source_info.col.saturating_sub(1);
        let prefix: String = line.chars().take(indent).collect();
        if !prefix.chars().all(|c| c == ' ') {
            return String::new();
        }

        let mut comments = Vec::new();
        for above in self.source_lines[..line_idx].iter().rev() {
            let trimmed = above.trim_start_matches(' ');
            if !trimmed.starts_with('#') || above.len() - trimmed.len() != indent {
                break;
            }
            comments.push(trimmed.trim_end());
        }
        comments.reverse();
        comments.join("\n")
    }
}

impl MarkedEventReceiver for YamlBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, style, anchor_id, tag) => {
                let source_info = self.make_source_info(&marker);
                let is_key = self.expecting_key();
                let mut node = Node::scalar(value, source_info);
                node.style = convert_style(style);
                node.tag = core_tag(tag.as_ref());
                if is_key {
                    node.head_comment = self.head_comment_for(&node.source_info);
                }
                self.push_complete(node, anchor_id);
            }

            Event::SequenceStart(anchor_id, _tag) => {
                let source_info = self.make_source_info(&marker);
                self.stack.push(BuildNode::Sequence {
                    source_info,
                    anchor_id,
                    items: Vec::new(),
                });
            }

            Event::MappingStart(anchor_id, _tag) => {
                let source_info = self.make_source_info(&marker);
                self.stack.push(BuildNode::Mapping {
                    source_info,
                    anchor_id,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }

            Event::SequenceEnd | Event::MappingEnd => {
                let Some(build_node) = self.stack.pop() else {
                    return;
                };
                let (node, anchor_id) = match build_node {
                    BuildNode::Sequence {
                        source_info,
                        anchor_id,
                        items,
                    } => (Node::sequence_with(items, source_info), anchor_id),
                    BuildNode::Mapping {
                        source_info,
                        anchor_id,
                        entries,
                        ..
                    } => (Node::mapping_with(dedupe_keys(entries), source_info), anchor_id),
                };
                self.push_complete(node, anchor_id);
            }

            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id) {
                Some(anchored) => {
                    let copy = anchored.clone();
                    self.push_complete(copy, 0);
                }
                None => {
                    let source_info = self.make_source_info(&marker);
                    self.error = Some(Error::ParseError {
                        message: format!("{source_info}: unknown anchor"),
                        location: Some(source_info),
                    });
                }
            },
        }
    }
}

/// Keys are unique; a later duplicate overwrites the earlier value in place.
fn dedupe_keys(entries: Vec<MappingEntry>) -> Vec<MappingEntry> {
    let mut result: Vec<MappingEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match result
            .iter_mut()
            .find(|e| e.key.is_scalar() && e.key.value() == entry.key.value())
        {
            Some(existing) => existing.value = entry.value,
            None => result.push(entry),
        }
    }
    result
}

fn convert_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Plain,
    }
}

/// Keep only core-schema tags (`!!str`, `!!int`, ...); local tags are ignored.
fn core_tag(tag: Option<&Tag>) -> Option<String> {
    let tag = tag?;
    if tag.handle == "!!" || tag.handle == "tag:yaml.org,2002:" {
        Some(tag.suffix.clone())
    } else {
        None
    }
}
