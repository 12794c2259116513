//! Section path handling.
//!
//! A section path is written `[A][B][C]`: one outer pair of brackets is
//! stripped and the rest is split on `][`. There is no escaping, so a
//! section whose name contains `][` cannot be addressed.

use std::fmt;
use std::str::FromStr;

use super::document::{Node, Section};
use super::error::Error;

/// Ordered list of section names leading from the root to a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPath {
    segments: Vec<String>,
}

impl SectionPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment, the top-level section.
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Last segment, the addressed section itself.
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Path of the enclosing section, `None` for a top-level path.
    pub fn parent(&self) -> Option<SectionPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(SectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl FromStr for SectionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        let segments: Vec<String> = inner.split("][").map(str::to_string).collect();
        if let Some(pos) = segments.iter().position(String::is_empty) {
            return Err(Error::Path(format!(
                "invalid section path '{}', empty section name at position {}.",
                s,
                pos + 1
            )));
        }
        Ok(SectionPath { segments })
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "[{}]", segment)?;
        }
        Ok(())
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Walk `path` from `root` without modifying anything.
///
/// A missing segment, or one naming a scalar or list, yields `None`.
pub fn find_section<'a>(root: &'a Section, path: &SectionPath) -> Option<&'a Section> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| current.section(segment))
}

/// Walk `path` from `root`, creating missing sections if `create_missing`.
///
/// Without `create_missing` this behaves like [`find_section`]. With it, a
/// segment naming an existing scalar or list is a type conflict: it is
/// never replaced by a section.
pub fn resolve_section<'a>(
    root: &'a mut Section,
    path: &SectionPath,
    create_missing: bool,
) -> Result<Option<&'a mut Section>, Error> {
    let mut current = root;

    for (depth, segment) in path.segments().iter().enumerate() {
        if create_missing && !current.contains_key(segment) {
            log::debug!("creating section {}", display_prefix(path, depth));
            current.set(segment.as_str(), Node::Section(Section::new()));
        }
        current = match current.get_mut(segment) {
            Some(Node::Section(section)) => section,
            Some(other) if create_missing => {
                return Err(Error::TypeConflict(format!(
                    "invalid path '{}', '{}' is a {}, not a section.",
                    path,
                    segment,
                    other.kind()
                )));
            }
            _ => return Ok(None),
        };
    }

    Ok(Some(current))
}

fn display_prefix(path: &SectionPath, depth: usize) -> String {
    path.segments()[..=depth]
        .iter()
        .map(|segment| format!("[{}]", segment))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
