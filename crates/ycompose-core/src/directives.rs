//! The directive block of a single file.

use crate::error::{Error, Result};
use ycompose_yaml::{Node, SourceInfo};

/// One entry of `include`.
#[derive(Debug, Clone)]
pub(crate) struct Include {
    pub pattern: String,
    pub source_info: SourceInfo,
}

/// What a file asks the loader to do besides contributing its content.
#[derive(Debug, Default)]
pub(crate) struct Directives {
    pub includes: Vec<Include>,
    pub patches: Vec<Node>,
    pub variables: Option<Node>,
}

/// Remove the directive block under `key` from `root` and validate it.
///
/// `vars` is accepted as a shorter spelling of `variables`; when both are
/// present, `variables` wins key by key.
pub(crate) fn take_directives(root: &mut Node, key: &str, file: &str) -> Result<Directives> {
    let Some(mut block) = root.delete(key) else {
        return Ok(Directives::default());
    };
    if !block.is_mapping() {
        return Err(Error::directive(format!(
            "{}: {} must be a mapping node",
            file, key
        )));
    }

    let mut directives = Directives::default();

    if let Some(include) = block.delete("include") {
        if !include.is_sequence() {
            return Err(Error::directive(format!(
                "{}: {}.include must be a sequence node({})",
                include.source_info,
                key,
                include.kind()
            )));
        }
        for entry in include.elements() {
            if !entry.is_scalar() {
                return Err(Error::directive(format!(
                    "{}: {}.include entries must be scalar nodes({})",
                    entry.source_info,
                    key,
                    entry.kind()
                )));
            }
            directives.includes.push(Include {
                pattern: entry.value().to_string(),
                source_info: entry.source_info.clone(),
            });
        }
    }

    if let Some(patches) = block.delete("patches") {
        if !patches.is_sequence() {
            return Err(Error::directive(format!(
                "{}: {}.patches must be a sequence node({})",
                patches.source_info,
                key,
                patches.kind()
            )));
        }
        directives.patches = patches.elements().to_vec();
    }

    for name in ["vars", "variables"] {
        let Some(variables) = block.delete(name) else {
            continue;
        };
        if !variables.is_mapping() {
            return Err(Error::directive(format!(
                "{}: {}.{} must be a mapping node({})",
                variables.source_info,
                key,
                name,
                variables.kind()
            )));
        }
        match directives.variables.as_mut() {
            Some(existing) => existing.merge(variables),
            None => directives.variables = Some(variables),
        }
    }

    Ok(directives)
}
