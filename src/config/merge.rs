//! Merge operations for overlaying one configuration onto another.
//!
//! Merging is a recursive overlay: subsections are combined, leaf values
//! from the source overwrite the target. Lists are replaced, never
//! concatenated.

use std::path::Path;

use super::document::{Document, Entry, Node, Section};
use super::error::Error;
use super::path::{resolve_section, SectionPath};

// =============================================================================
// Core Merge
// =============================================================================

/// Recursively overlay `source` onto `target`.
///
/// Entries new to `target` keep their source comments. Overwritten leaves
/// keep the target's comments. A source subsection landing on a target
/// scalar or list is a type conflict.
pub fn merge_sections(source: Section, target: &mut Section) -> Result<(), Error> {
    for (key, mut entry) in source.into_entries() {
        entry.strip_raw();
        match entry.node {
            Node::Section(source_child) => match target.get_mut(&key) {
                Some(Node::Section(target_child)) => {
                    merge_sections(source_child, target_child)?;
                }
                Some(other) => {
                    return Err(Error::TypeConflict(format!(
                        "cannot merge section [{}] into existing {} '{}'.",
                        key,
                        other.kind(),
                        key
                    )));
                }
                None => {
                    log::debug!("merge: adding section [{}]", key);
                    target.insert_entry(
                        key,
                        Entry {
                            node: Node::Section(source_child),
                            decor: entry.decor,
                        },
                    );
                }
            },
            leaf => {
                if target.contains_key(&key) {
                    target.set(key, leaf);
                } else {
                    target.insert_entry(
                        key,
                        Entry {
                            node: leaf,
                            decor: entry.decor,
                        },
                    );
                }
            }
        }
    }
    Ok(())
}

fn target_section<'a>(
    root: &'a mut Section,
    path: &SectionPath,
) -> Result<&'a mut Section, Error> {
    resolve_section(root, path, true)?
        .ok_or_else(|| Error::Path(format!("invalid path '{}', cannot create section.", path)))
}

// =============================================================================
// Entry Points
// =============================================================================

/// Merge a document holding exactly one root section into `path`.
///
/// The root section's name must match the first segment of `path`, which
/// keeps a fragment written for one top-level namespace out of another.
/// The root's contents, not the root itself, are merged.
pub fn merge_from_document(
    source: Document,
    root: &mut Section,
    path: &SectionPath,
) -> Result<(), Error> {
    let names: Vec<&str> = source.keys().collect();
    if names.len() != 1 {
        return Err(Error::MultipleRoots(format!(
            "source config must have exactly one root section, found: [{}]",
            names.join(", ")
        )));
    }
    let root_name = names[0].to_string();

    if !source.get(&root_name).is_some_and(Node::is_section) {
        return Err(Error::TypeConflict(format!(
            "source config root '{}' is a value, not a section",
            root_name
        )));
    }
    if root_name != path.first() {
        return Err(Error::RootMismatch(format!(
            "source config root section [{}] does not match target section root [{}]",
            root_name,
            path.first()
        )));
    }

    let target = target_section(root, path)?;
    let Some((_, entry)) = source.into_root().into_entries().next() else {
        return Ok(());
    };
    if let Node::Section(contents) = entry.node {
        log::debug!("merging root [{}] into {}", root_name, path);
        merge_sections(contents, target)?;
    }
    Ok(())
}

/// Read `file` and merge it with [`merge_from_document`].
pub fn merge_from_file(file: &Path, root: &mut Section, path: &SectionPath) -> Result<(), Error> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| Error::Io(format!("Failed to read '{}': {}", file.display(), e)))?;
    let source: Document = text.parse().map_err(|e| match e {
        Error::Parse(msg) => Error::Parse(format!("Failed to parse '{}': {}", file.display(), msg)),
        other => other,
    })?;
    merge_from_document(source, root, path).map_err(|e| match e {
        Error::MultipleRoots(msg) => {
            Error::MultipleRoots(format!("{} ({})", msg, file.display()))
        }
        other => other,
    })
}

/// Parse `text` and merge its whole top level into `path`.
///
/// Unlike [`merge_from_document`] there is no single-root requirement and
/// no name check.
pub fn merge_from_text(text: &str, root: &mut Section, path: &SectionPath) -> Result<(), Error> {
    let source: Document = text.parse()?;
    let target = target_section(root, path)?;
    if source.is_empty() {
        log::info!("nothing to merge, {} left as is", path);
    }
    log::debug!("merging {} top-level entries into {}", source.len(), path);
    merge_sections(source.into_root(), target)
}

// =============================================================================
// Unit Tests
// =============================================================================
