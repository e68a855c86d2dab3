//! JSON Pointer parsing and evaluation against a [`Node`] tree.

use crate::{Error, Node, Result};
use std::fmt;

/// A parsed JSON Pointer.
///
/// The empty token list is the root pointer and displays as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer {
    tokens: Vec<Token>,
}

/// One `/`-separated segment of a pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The segment as written, still escaped.
    pub original: String,

    /// The unescaped segment, used as a mapping key.
    pub key: String,

    /// Set when the segment can address a sequence element.
    pub index: Option<Index>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    At(usize),
    /// `-`, one past the last element.
    Append,
}

impl Token {
    fn parse(original: &str) -> Self {
        let key = original.replace("~1", "/").replace("~0", "~");
        let index = if key == "-" {
            Some(Index::Append)
        } else if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            key.parse().ok().map(Index::At)
        } else {
            None
        };
        Self {
            original: original.to_string(),
            key,
            index,
        }
    }

    fn from_key(key: &str) -> Self {
        let original = key.replace('~', "~0").replace('/', "~1");
        Self::parse(&original)
    }

    pub fn is_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn is_append(&self) -> bool {
        self.index == Some(Index::Append)
    }
}

impl JsonPointer {
    /// Parse a pointer string. It must start with `/`.
    pub fn parse(path: &str) -> Result<Self> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(Error::InvalidPointer(path.to_string()));
        };
        Ok(Self {
            tokens: rest.split('/').map(Token::parse).collect(),
        })
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Split into the parent pointer and the last token.
    pub fn pop(&self) -> Option<(JsonPointer, &Token)> {
        let (last, parent) = self.tokens.split_last()?;
        Some((
            JsonPointer {
                tokens: parent.to_vec(),
            },
            last,
        ))
    }

    /// A child pointer addressing `key`, escaped as needed.
    pub fn push_key(&self, key: &str) -> JsonPointer {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::from_key(key));
        JsonPointer { tokens }
    }

    pub fn push_index(&self, index: usize) -> JsonPointer {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::parse(&index.to_string()));
        JsonPointer { tokens }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&token.original)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for JsonPointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Node {
    /// Resolve a pointer string against this node.
    ///
    /// `/` is this node itself.
    pub fn find_by_pointer(&self, path: &str) -> Result<&Node> {
        let pointer = JsonPointer::parse(path)?;
        if path == "/" {
            return Ok(self);
        }
        self.resolve(&pointer)
    }

    /// Resolve a parsed pointer.
    ///
    /// A mapping that has the token as a key is always descended into.
    /// Otherwise the token must be an index into a sequence; `-` resolves to
    /// [`Error::AfterLastElement`].
    pub fn resolve(&self, pointer: &JsonPointer) -> Result<&Node> {
        let mut current = self;
        for token in pointer.tokens() {
            if let Some(child) = current.get(&token.key) {
                current = child;
                continue;
            }
            let position = index_in(current, token, pointer)?;
            current = &current.elements()[position];
        }
        Ok(current)
    }

    pub fn resolve_mut(&mut self, pointer: &JsonPointer) -> Result<&mut Node> {
        let mut current = self;
        for token in pointer.tokens() {
            if current.has_key(&token.key) {
                current = current.get_mut(&token.key).ok_or_else(|| not_found(pointer))?;
                continue;
            }
            let position = index_in(current, token, pointer)?;
            current = current
                .elements_mut()
                .and_then(|elements| elements.get_mut(position))
                .ok_or_else(|| not_found(pointer))?;
        }
        Ok(current)
    }
}

fn not_found(pointer: &JsonPointer) -> Error {
    Error::NotFound {
        path: pointer.to_string(),
    }
}

/// Check that `token` is a usable index into `node` and return it.
fn index_in(node: &Node, token: &Token, pointer: &JsonPointer) -> Result<usize> {
    let Some(index) = token.index else {
        return Err(not_found(pointer));
    };
    if !node.is_sequence() {
        return Err(Error::NotASequence {
            path: pointer.to_string(),
            index: token.original.clone(),
            kind: node.kind(),
        });
    }
    match index {
        Index::Append => Err(Error::AfterLastElement {
            path: pointer.to_string(),
        }),
        Index::At(i) if i >= node.len() => Err(Error::IndexOutOfBounds {
            path: pointer.to_string(),
            index: i,
        }),
        Index::At(i) => Ok(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_parse_tokens() {
        let p = JsonPointer::parse("/a~1b/m~0n/0/-/01").unwrap();
        let keys: Vec<_> = p.tokens().iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["a/b", "m~n", "0", "-", "01"]);
        assert_eq!(p.tokens()[0].index, None);
        assert_eq!(p.tokens()[2].index, Some(Index::At(0)));
        assert!(p.tokens()[3].is_append());
        assert_eq!(p.tokens()[4].index, Some(Index::At(1)));
        assert_eq!(p.to_string(), "/a~1b/m~0n/0/-/01");
    }

    #[test]
    fn test_unescape_order() {
        // `~01` is `~1` literally, not `/`
        let p = JsonPointer::parse("/~01").unwrap();
        assert_eq!(p.tokens()[0].key, "~1");
    }

    #[test]
    fn test_parse_requires_leading_slash() {
        let err = JsonPointer::parse("a/b").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON Pointer: a/b");
    }

    #[test]
    fn test_pop() {
        let p = JsonPointer::parse("/test/value/1").unwrap();
        let (parent, last) = p.pop().unwrap();
        assert_eq!(parent.to_string(), "/test/value");
        assert_eq!(last.index, Some(Index::At(1)));

        let (root, last) = JsonPointer::parse("/test").unwrap().pop().map(|(p, t)| (p, t.clone())).unwrap();
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "/");
        assert_eq!(last.key, "test");

        assert!(JsonPointer::root().pop().is_none());
    }

    #[test]
    fn test_push_escapes() {
        let p = JsonPointer::root().push_key("a/b").push_key("c~d").push_index(3);
        assert_eq!(p.to_string(), "/a~1b/c~0d/3");
        assert_eq!(p.tokens()[0].key, "a/b");
    }

    #[test]
    fn test_find_by_pointer() {
        let doc = parse("test:\n  value:\n    - 1\n    - 2\n  '0': zero\n").unwrap();
        assert_eq!(doc.find_by_pointer("/test/value/1").unwrap().value(), "2");
        assert_eq!(doc.find_by_pointer("/test/0").unwrap().value(), "zero");
        assert!(doc.find_by_pointer("/").unwrap().is_mapping());
    }

    #[test]
    fn test_find_errors() {
        let doc = parse("test:\n  value:\n    - 1\n  s: x\n").unwrap();

        let err = doc.find_by_pointer("/test/missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "/test/missing: can not find nodes matches path");

        let err = doc.find_by_pointer("/test/s/0").unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "/test/s/0: can not evaluate an index 0 on scalar object"
        );

        let err = doc.find_by_pointer("/test/value/5").unwrap_err();
        assert_eq!(err.to_string(), "/test/value/5: out of bounds index 5");

        let err = doc.find_by_pointer("/test/value/-").unwrap_err();
        assert_eq!(err.to_string(), "/test/value/-: after last element");
    }

    #[test]
    fn test_resolve_mut() {
        let mut doc = parse("a:\n  - x\n  - y\n").unwrap();
        let p = JsonPointer::parse("/a/1").unwrap();
        doc.resolve_mut(&p).unwrap().set_scalar("z", Default::default(), None);
        assert_eq!(doc.find_by_pointer("/a/1").unwrap().value(), "z");
    }
}
