//! The document tree.

use crate::SourceInfo;
use std::fmt;
use std::ops::ControlFlow;
use yaml_rust2::Yaml;

/// A node of a YAML/JSON document with provenance.
///
/// Every node owns its children. There is no sharing between positions in a
/// tree, so moving a node from one document into another (merge, patch)
/// carries its provenance along with it and nothing else.
///
/// Scalars store their raw text. The type of a scalar is never stored
/// structurally; see [`Node::scalar_type`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Where this node came from.
    pub source_info: SourceInfo,

    /// Explicit core tag suffix (e.g. `str` for `!!str`).
    pub tag: Option<String>,

    /// Presentation style of a scalar. Ignored for containers.
    pub style: ScalarStyle,

    /// Whole-line comment block written directly above this node, with the
    /// leading `#` of each line retained.
    pub head_comment: String,

    /// Trailing comment text, without the `#`.
    pub line_comment: String,

    content: Content,
}

#[derive(Debug, Clone)]
enum Content {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<MappingEntry>),
}

/// A key/value pair of a mapping node.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub key: Node,
    pub value: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::Scalar => "scalar",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scalar was written in its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Any style other than plain forces the scalar to be text.
    pub fn is_quoted(self) -> bool {
        self != ScalarStyle::Plain
    }
}

/// The inferred type of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

impl ScalarType {
    /// Guess the type of a bare piece of text.
    ///
    /// This is the rule used for variable defaults and substitution values:
    /// exactly `null` is null, `true`/`false`/`yes`/`no`/`on`/`off` are
    /// booleans, then integers, then floats; anything else is a string.
    pub fn guess(text: &str) -> Self {
        match text {
            "null" => ScalarType::Null,
            "true" | "false" | "yes" | "no" | "on" | "off" => ScalarType::Bool,
            _ if text.parse::<i64>().is_ok() => ScalarType::Int,
            _ if text.parse::<f64>().is_ok() => ScalarType::Float,
            _ => ScalarType::Str,
        }
    }

    /// Resolve an untagged plain scalar with the YAML core schema.
    pub fn resolve_plain(text: &str) -> Self {
        if text.is_empty() {
            return ScalarType::Null;
        }
        match Yaml::from_str(text) {
            Yaml::Null => ScalarType::Null,
            Yaml::Boolean(_) => ScalarType::Bool,
            Yaml::Integer(_) => ScalarType::Int,
            Yaml::Real(_) => ScalarType::Float,
            _ => ScalarType::Str,
        }
    }

    /// Map a core tag suffix to a type. Unknown tags are treated as text.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "null" => ScalarType::Null,
            "bool" => ScalarType::Bool,
            "int" => ScalarType::Int,
            "float" => ScalarType::Float,
            _ => ScalarType::Str,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Null => "null",
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Str => "str",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    fn with_content(content: Content, source_info: SourceInfo) -> Self {
        Self {
            source_info,
            tag: None,
            style: ScalarStyle::Plain,
            head_comment: String::new(),
            line_comment: String::new(),
            content,
        }
    }

    /// An untagged plain scalar. Its type is inferred from `text`.
    pub fn scalar(text: impl Into<String>, source_info: SourceInfo) -> Self {
        Self::with_content(Content::Scalar(text.into()), source_info)
    }

    /// A scalar that is always a string, whatever its text looks like.
    pub fn string(text: impl Into<String>, source_info: SourceInfo) -> Self {
        let mut node = Self::scalar(text, source_info);
        node.tag = Some("str".to_string());
        node
    }

    pub fn null(source_info: SourceInfo) -> Self {
        Self::scalar("null", source_info)
    }

    /// An empty mapping.
    pub fn mapping(source_info: SourceInfo) -> Self {
        Self::with_content(Content::Mapping(Vec::new()), source_info)
    }

    /// A mapping built from already ordered entries.
    pub fn mapping_with(entries: Vec<MappingEntry>, source_info: SourceInfo) -> Self {
        Self::with_content(Content::Mapping(entries), source_info)
    }

    /// An empty sequence.
    pub fn sequence(source_info: SourceInfo) -> Self {
        Self::with_content(Content::Sequence(Vec::new()), source_info)
    }

    pub fn sequence_with(elements: Vec<Node>, source_info: SourceInfo) -> Self {
        Self::with_content(Content::Sequence(elements), source_info)
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            Content::Scalar(_) => NodeKind::Scalar,
            Content::Sequence(_) => NodeKind::Sequence,
            Content::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.content, Content::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.content, Content::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.content, Content::Scalar(_))
    }

    /// Raw scalar text, or `None` for containers.
    pub fn as_str(&self) -> Option<&str> {
        match &self.content {
            Content::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Raw scalar text; empty for containers.
    pub fn value(&self) -> &str {
        self.as_str().unwrap_or_default()
    }

    /// Turn this node into a scalar with the given text, style and tag.
    ///
    /// Provenance and comments are kept.
    pub fn set_scalar(&mut self, text: impl Into<String>, style: ScalarStyle, tag: Option<String>) {
        self.content = Content::Scalar(text.into());
        self.style = style;
        self.tag = tag;
    }

    /// The inferred type of a scalar; `None` for containers.
    ///
    /// An explicit tag wins, then any quoted or block style means a string,
    /// then the plain text is resolved with the YAML core schema.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        let text = self.as_str()?;
        if let Some(tag) = &self.tag {
            return Some(ScalarType::from_tag(tag));
        }
        if self.style.is_quoted() {
            return Some(ScalarType::Str);
        }
        Some(ScalarType::resolve_plain(text))
    }

    pub fn is_string(&self) -> bool {
        self.scalar_type() == Some(ScalarType::Str)
    }

    /// Mapping entries; empty for other kinds.
    pub fn entries(&self) -> &[MappingEntry] {
        match &self.content {
            Content::Mapping(entries) => entries,
            _ => &[],
        }
    }

    pub fn entries_mut(&mut self) -> &mut [MappingEntry] {
        match &mut self.content {
            Content::Mapping(entries) => entries,
            _ => &mut [],
        }
    }

    /// Sequence elements; empty for other kinds.
    pub fn elements(&self) -> &[Node] {
        match &self.content {
            Content::Sequence(elements) => elements,
            _ => &[],
        }
    }

    /// Mutable access to a sequence's elements; `None` for other kinds.
    pub fn elements_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.content {
            Content::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    /// Number of entries (mapping) or elements (sequence). Zero for scalars.
    pub fn len(&self) -> usize {
        match &self.content {
            Content::Scalar(_) => 0,
            Content::Sequence(elements) => elements.len(),
            Content::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()
            .iter()
            .find(|entry| entry.key.value() == key)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries_mut()
            .iter_mut()
            .find(|entry| entry.key.value() == key)
            .map(|entry| &mut entry.value)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries().iter().any(|entry| entry.key.value() == key)
    }

    /// Store `value` under `key`, returning the value it replaced.
    ///
    /// An existing key keeps its position and its key node; only the value
    /// is swapped. A new scalar key is inserted before the first existing
    /// key that sorts after it (byte-wise), so that keys added by merges and
    /// patches land in a deterministic place. A new non-scalar key is
    /// appended. Does nothing on non-mappings.
    pub fn put(&mut self, key: Node, value: Node) -> Option<Node> {
        let Content::Mapping(entries) = &mut self.content else {
            return None;
        };
        if let Some(entry) = entries.iter_mut().find(|e| e.key.value() == key.value()) {
            return Some(std::mem::replace(&mut entry.value, value));
        }

        let pos = if key.is_scalar() {
            entries
                .iter()
                .position(|e| key.value() < e.key.value())
                .unwrap_or(entries.len())
        } else {
            entries.len()
        };
        entries.insert(pos, MappingEntry { key, value });
        None
    }

    /// Remove `key`, returning its value.
    pub fn delete(&mut self, key: &str) -> Option<Node> {
        let Content::Mapping(entries) = &mut self.content else {
            return None;
        };
        let pos = entries.iter().position(|e| e.key.value() == key)?;
        Some(entries.remove(pos).value)
    }

    /// Append to a sequence. Does nothing on other kinds.
    pub fn append(&mut self, value: Node) {
        if let Content::Sequence(elements) = &mut self.content {
            elements.push(value);
        }
    }

    /// Visit each mapping entry in order.
    ///
    /// The callback returns `ControlFlow::Break` to stop early or
    /// `ControlFlow::Continue` to move on; an `Err` aborts the iteration and
    /// is returned.
    pub fn try_for_each_entry<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&Node, &Node) -> Result<ControlFlow<()>, E>,
    {
        for entry in self.entries() {
            if f(&entry.key, &entry.value)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn try_for_each_entry_mut<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Node, &mut Node) -> Result<ControlFlow<()>, E>,
    {
        for entry in self.entries_mut() {
            if f(&mut entry.key, &mut entry.value)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Visit each sequence element in order, with its index.
    pub fn try_for_each_element<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &Node) -> Result<ControlFlow<()>, E>,
    {
        for (i, element) in self.elements().iter().enumerate() {
            if f(i, element)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn try_for_each_element_mut<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &mut Node) -> Result<ControlFlow<()>, E>,
    {
        let Some(elements) = self.elements_mut() else {
            return Ok(());
        };
        for (i, element) in elements.iter_mut().enumerate() {
            if f(i, element)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Deep copy with every position reset to line 1, column 1.
    ///
    /// Files are kept. Used for synthetic subtrees so that no stale
    /// position leaks into diagnostics.
    pub fn clone_position_reset(&self) -> Node {
        let mut copy = self.clone();
        copy.reset_positions();
        copy
    }

    pub fn reset_positions(&mut self) {
        self.source_info.reset_position();
        self.for_each_child_mut(&mut |child| child.reset_positions());
    }

    /// Attribute this node and all of its descendants to `file`.
    pub fn set_source_file(&mut self, file: &str) {
        self.source_info.file = Some(file.to_string());
        self.for_each_child_mut(&mut |child| child.set_source_file(file));
    }

    /// Drop head comments everywhere in the subtree.
    pub fn strip_comments(&mut self) {
        self.head_comment.clear();
        self.for_each_child_mut(&mut |child| child.strip_comments());
    }

    fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Node)) {
        match &mut self.content {
            Content::Scalar(_) => {}
            Content::Sequence(elements) => elements.iter_mut().for_each(|e| f(e)),
            Content::Mapping(entries) => {
                for entry in entries {
                    f(&mut entry.key);
                    f(&mut entry.value);
                }
            }
        }
    }

    /// Deep-merge `overlay` into this node.
    ///
    /// Different kinds, or two scalars: the overlay replaces this node
    /// outright, provenance included. Mappings merge key by key, recursing
    /// where both sides have the key and inserting with [`Node::put`]
    /// otherwise. Sequences concatenate, this node's elements first.
    pub fn merge(&mut self, overlay: Node) {
        if self.kind() != overlay.kind() || self.is_scalar() {
            *self = overlay;
            return;
        }
        match overlay.content {
            Content::Mapping(entries) => {
                for MappingEntry { key, value } in entries {
                    match self.get_mut(key.value()) {
                        Some(existing) => existing.merge(value),
                        None => {
                            self.put(key, value);
                        }
                    }
                }
            }
            Content::Sequence(elements) => {
                if let Some(mine) = self.elements_mut() {
                    mine.extend(elements);
                }
            }
            Content::Scalar(_) => {}
        }
    }

    /// Find the pointer path of `needle` inside this tree.
    ///
    /// Nodes are compared by identity, not by value, so this answers whether
    /// `needle` is still a live part of this tree.
    pub fn path_of(&self, needle: &Node) -> Option<crate::JsonPointer> {
        self.path_of_from(needle, crate::JsonPointer::root())
    }

    fn path_of_from(&self, needle: &Node, here: crate::JsonPointer) -> Option<crate::JsonPointer> {
        if std::ptr::eq(self, needle) {
            return Some(here);
        }
        match &self.content {
            Content::Scalar(_) => None,
            Content::Sequence(elements) => elements
                .iter()
                .enumerate()
                .find_map(|(i, e)| e.path_of_from(needle, here.push_index(i))),
            Content::Mapping(entries) => entries.iter().find_map(|entry| {
                let path = here.push_key(entry.key.value());
                if std::ptr::eq(&entry.key, needle) {
                    return Some(path);
                }
                entry.value.path_of_from(needle, path)
            }),
        }
    }
}
