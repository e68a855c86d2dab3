//! Source map generation and source location comments.

use crate::{JsonPointer, Node, SourceMap};

impl Node {
    /// Build a path-to-source map of this tree.
    ///
    /// `/` maps to this node. A mapping key first maps to the key node, and
    /// a scalar value then overwrites that with its own location. Sequence
    /// elements map by index. Sources are recorded for every value node in
    /// visiting order.
    pub fn to_source_map(&self) -> SourceMap {
        let mut map = SourceMap::new();
        let root = JsonPointer::root();
        map.add_mapping(&root.to_string(), self.source_info.file_name(), self.source_info.line);
        collect(self, &root, &mut map);
        map
    }

    /// Append ` file:line` to the line comment of every scalar value, and of
    /// every key whose value is a container.
    pub fn add_source_comments(&mut self) {
        if self.is_scalar() {
            let location = format!(" {}:{}", self.source_info.file_name(), self.source_info.line);
            self.line_comment.push_str(&location);
            return;
        }
        for entry in self.entries_mut() {
            if !entry.value.is_scalar() {
                entry.key.add_source_comments();
            }
            entry.value.add_source_comments();
        }
        if let Some(elements) = self.elements_mut() {
            elements.iter_mut().for_each(Node::add_source_comments);
        }
    }
}

fn collect(node: &Node, path: &JsonPointer, map: &mut SourceMap) {
    map.add_source(node.source_info.file_name());
    if node.is_mapping() {
        for entry in node.entries() {
            let child = path.push_key(entry.key.value());
            map.add_mapping(
                &child.to_string(),
                entry.key.source_info.file_name(),
                entry.key.source_info.line,
            );
            collect(&entry.value, &child, map);
        }
    } else if node.is_sequence() {
        for (i, element) in node.elements().iter().enumerate() {
            collect(element, &path.push_index(i), map);
        }
    } else {
        map.add_mapping(&path.to_string(), node.source_info.file_name(), node.source_info.line);
    }
}
