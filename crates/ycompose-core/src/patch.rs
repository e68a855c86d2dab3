//! JSON-Patch style `add` / `remove` / `replace` over a [`Node`] tree.

use crate::error::{Error, Result};
use thiserror::Error;
use ycompose_yaml::{Index, JsonPointer, Node, NodeKind, SourceInfo, Token};

#[derive(Debug, Error)]
enum PatchError {
    #[error("invalid patch")]
    NotAMapping,

    #[error("invalid patch(op and path are required)")]
    MissingOpOrPath,

    #[error("invalid patch(value is required)")]
    MissingValue,

    #[error("unsupported patch operation: {0}")]
    UnsupportedOp(String),

    #[error("can not perform an add value before index {index}(path: {path}, size: {size})")]
    AddOutOfRange {
        index: usize,
        path: JsonPointer,
        size: usize,
    },

    #[error("can not perform an add '{key}' key operation on (an) {kind} node(path: {path})")]
    AddOnKind {
        key: String,
        kind: NodeKind,
        path: JsonPointer,
    },

    #[error("can not remove a value at index {index}(path: {path}, size: {size})")]
    RemoveOutOfRange {
        index: usize,
        path: JsonPointer,
        size: usize,
    },

    #[error("can not remove a value {path}(value does not exist)")]
    RemoveMissing { path: JsonPointer },

    #[error("can not perform a remove operation on (an) {kind} node(path: {path})")]
    RemoveOnKind { kind: NodeKind, path: JsonPointer },

    #[error("can not create '{key}' inside (an) {kind} node")]
    CannotCreate { key: String, kind: NodeKind },

    #[error("invalid patch path")]
    Pointer(#[from] ycompose_yaml::Error),
}

type PatchResult<T> = std::result::Result<T, PatchError>;

/// Apply one patch object (`{op, path, value?}`) to `target`.
///
/// Values are inserted with the patch's own provenance, and so are any
/// containers created on the way to a missing parent.
///
/// # Errors
///
/// Every failure is a directive error prefixed with the patch's location,
/// e.g. `test.yml(line:4): can not remove a value /a(value does not exist)`.
/// Pointer evaluation failures are kept as the cause. A failed `add` leaves
/// `target` as it was.
pub fn apply_patch(target: &mut Node, patch: &Node) -> Result<()> {
    apply(target, patch).map_err(|e| {
        let err = Error::directive(format!("{}: {}", patch.source_info, e));
        match e {
            PatchError::Pointer(cause) => err.with_cause(cause),
            _ => err,
        }
    })
}

fn apply(target: &mut Node, patch: &Node) -> PatchResult<()> {
    if !patch.is_mapping() {
        return Err(PatchError::NotAMapping);
    }
    let (Some(op), Some(path)) = (patch.get("op"), patch.get("path")) else {
        return Err(PatchError::MissingOpOrPath);
    };
    let op = op.value();
    let pointer = JsonPointer::parse(path.value())?;
    let origin = &patch.source_info;

    tracing::debug!(op, path = %pointer, source = %origin, "applying patch");

    match op {
        "add" => {
            let value = patch.get("value").ok_or(PatchError::MissingValue)?;
            add(target, &pointer, value.clone(), origin)
        }
        "remove" => remove(target, &pointer),
        "replace" => {
            let value = patch.get("value").ok_or(PatchError::MissingValue)?;
            if let Err(e) = remove(target, &pointer) {
                tracing::trace!(path = %pointer, error = %e, "replace target did not exist");
            }
            match add(target, &pointer, value.clone(), origin) {
                Err(PatchError::Pointer(e)) if e.is_not_found() => Ok(()),
                other => other,
            }
        }
        other => Err(PatchError::UnsupportedOp(other.to_string())),
    }
}

fn add(root: &mut Node, pointer: &JsonPointer, value: Node, origin: &SourceInfo) -> PatchResult<()> {
    let Some((parent, last)) = pointer.pop() else {
        return Err(ycompose_yaml::Error::InvalidPointer(pointer.to_string()).into());
    };

    let missing = match root.resolve(&parent) {
        Ok(_) => false,
        Err(e) if e.is_not_found() => true,
        Err(e) => return Err(e.into()),
    };
    let created = if missing {
        ensure_parents(root, pointer, origin)?
    } else {
        None
    };
    let result = insert(root, &parent, last, value, origin);
    if result.is_err() {
        rollback(root, created);
    }
    result
}

fn insert(
    root: &mut Node,
    parent: &JsonPointer,
    last: &Token,
    value: Node,
    origin: &SourceInfo,
) -> PatchResult<()> {
    let target = root.resolve_mut(parent)?;

    match (target.kind(), last.index) {
        (NodeKind::Sequence, Some(index)) => {
            let size = target.len();
            let position = match index {
                Index::Append => size,
                Index::At(i) if i > size => {
                    return Err(PatchError::AddOutOfRange {
                        index: i,
                        path: parent.clone(),
                        size,
                    });
                }
                Index::At(i) => i,
            };
            if let Some(elements) = target.elements_mut() {
                elements.insert(position, value);
            }
            Ok(())
        }
        (NodeKind::Mapping, _) => {
            target.put(Node::string(last.key.as_str(), origin.clone()), value);
            Ok(())
        }
        (kind, _) => Err(PatchError::AddOnKind {
            key: last.original.clone(),
            kind,
            path: parent.clone(),
        }),
    }
}

fn remove(root: &mut Node, pointer: &JsonPointer) -> PatchResult<()> {
    let Some((parent, last)) = pointer.pop() else {
        return Err(ycompose_yaml::Error::InvalidPointer(pointer.to_string()).into());
    };
    let target = root.resolve_mut(&parent)?;

    match (target.kind(), last.index) {
        (NodeKind::Sequence, Some(Index::At(i))) => {
            let size = target.len();
            if i >= size {
                return Err(PatchError::RemoveOutOfRange {
                    index: i,
                    path: parent,
                    size,
                });
            }
            if let Some(elements) = target.elements_mut() {
                elements.remove(i);
            }
            Ok(())
        }
        (NodeKind::Mapping, _) => match target.delete(&last.key) {
            Some(_) => Ok(()),
            None => Err(PatchError::RemoveMissing {
                path: pointer.clone(),
            }),
        },
        (kind, _) => Err(PatchError::RemoveOnKind { kind, path: parent }),
    }
}

/// Create the missing containers above the last token of `pointer`.
///
/// Each created container is a sequence when the token after it is an
/// index and a mapping otherwise. Returns the path of the outermost
/// container created; on failure nothing is left behind.
fn ensure_parents(
    root: &mut Node,
    pointer: &JsonPointer,
    origin: &SourceInfo,
) -> PatchResult<Option<JsonPointer>> {
    let mut created = None;
    match create_missing(root, pointer, origin, &mut created) {
        Ok(()) => Ok(created),
        Err(e) => {
            rollback(root, created);
            Err(e)
        }
    }
}

fn create_missing(
    root: &mut Node,
    pointer: &JsonPointer,
    origin: &SourceInfo,
    created: &mut Option<JsonPointer>,
) -> PatchResult<()> {
    let mut current = root;
    let mut path = JsonPointer::root();
    for pair in pointer.tokens().windows(2) {
        let (child, child_path, fresh) = descend_or_create(current, &path, &pair[0], &pair[1], origin)?;
        if fresh && created.is_none() {
            *created = Some(child_path.clone());
        }
        current = child;
        path = child_path;
    }
    Ok(())
}

/// Remove the container [`ensure_parents`] created, if any.
fn rollback(root: &mut Node, created: Option<JsonPointer>) {
    if let Some(path) = created {
        if let Err(e) = remove(root, &path) {
            tracing::trace!(path = %path, error = %e, "could not undo created parents");
        }
    }
}

fn descend_or_create<'n>(
    node: &'n mut Node,
    path: &JsonPointer,
    token: &Token,
    next: &Token,
    origin: &SourceInfo,
) -> PatchResult<(&'n mut Node, JsonPointer, bool)> {
    let container = || {
        if next.is_index() {
            Node::sequence(origin.clone())
        } else {
            Node::mapping(origin.clone())
        }
    };
    let cannot_create = |kind| PatchError::CannotCreate {
        key: token.original.clone(),
        kind,
    };

    match (node.kind(), token.index) {
        (NodeKind::Sequence, Some(index)) => {
            let kind = node.kind();
            let Some(elements) = node.elements_mut() else {
                return Err(cannot_create(kind));
            };
            let size = elements.len();
            let (position, fresh) = match index {
                Index::At(i) if i < size => (i, false),
                Index::At(i) if i > size => return Err(cannot_create(kind)),
                _ => {
                    elements.push(container());
                    (size, true)
                }
            };
            Ok((&mut elements[position], path.push_index(position), fresh))
        }
        (NodeKind::Mapping, _) => {
            let fresh = !node.has_key(&token.key);
            if fresh {
                node.put(Node::string(token.key.as_str(), origin.clone()), container());
            }
            let kind = node.kind();
            let child = node.get_mut(&token.key).ok_or_else(|| cannot_create(kind))?;
            Ok((child, path.push_key(&token.key), fresh))
        }
        (kind, _) => Err(cannot_create(kind)),
    }
}
