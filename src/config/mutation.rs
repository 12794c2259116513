//! Mutation operations for configuration sections.
//!
//! Provides set-value, section creation and removal, and bulk assignment.

use super::document::{Node, Section};
use super::error::Error;
use super::path::{resolve_section, SectionPath};

/// Resolve `path`, creating every missing section on the way.
fn section_at<'a>(root: &'a mut Section, path: &SectionPath) -> Result<&'a mut Section, Error> {
    resolve_section(root, path, true)?
        .ok_or_else(|| Error::Path(format!("invalid path '{}', cannot create section.", path)))
}

/// Set `key` to the string `value` in the section at `path`.
pub fn set_value(
    root: &mut Section,
    path: &SectionPath,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    let section = section_at(root, path)?;
    log::debug!("setting {}[{}]", path, key);
    section.set(key, Node::Scalar(value.to_string()));
    Ok(())
}

/// Create the section at `path`. Creating an existing section is a no-op.
pub fn create_section(root: &mut Section, path: &SectionPath) -> Result<(), Error> {
    section_at(root, path).map(|_| ())
}

/// Remove the entry named by the last segment of `path` from its parent.
///
/// Returns whether anything was removed. The entry is usually a section,
/// but a value of that name is removed too. Missing parents are not
/// created.
pub fn remove_section(root: &mut Section, path: &SectionPath) -> Result<bool, Error> {
    let parent = match path.parent() {
        None => Some(root),
        Some(parent_path) => resolve_section(root, &parent_path, false)?,
    };
    let Some(parent) = parent else {
        return Ok(false);
    };
    match parent.remove(path.last()) {
        Some(node) => {
            log::debug!("removed {} {}", node.kind(), path);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Split `key=value` strings on the first `=`, trimming both sides.
pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Vec<(String, String)>, Error> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::MalformedPair(format!("Invalid key=value pair: {}", pair))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::MalformedPair(format!(
                    "Invalid key=value pair: {} (empty key)",
                    pair
                )));
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Set several `key=value` pairs in the section at `path`.
///
/// All pairs are validated before anything is changed, so a malformed
/// pair leaves the document untouched.
pub fn set_multiple_values<S: AsRef<str>>(
    root: &mut Section,
    path: &SectionPath,
    pairs: &[S],
) -> Result<usize, Error> {
    let pairs = parse_pairs(pairs)?;
    let section = section_at(root, path)?;
    for (key, value) in &pairs {
        log::debug!("setting {}[{}]", path, key);
        section.set(key.as_str(), Node::Scalar(value.clone()));
    }
    Ok(pairs.len())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse::parse;
    use crate::config::path::find_section;
    use crate::config::query::{get_value, has_section};
    use crate::config::Document;

    fn path(s: &str) -> SectionPath {
        s.parse().unwrap()
    }

    fn scalar(s: &str) -> Node {
        Node::Scalar(s.to_string())
    }

    #[test]
    fn test_set_then_get_on_empty_document() {
        let mut doc = Document::new();
        set_value(&mut doc, &path("[Station]"), "location", "Test Site").unwrap();
        assert_eq!(
            get_value(&doc, &path("[Station]"), "location"),
            Some(&scalar("Test Site"))
        );
    }

    #[test]
    fn test_set_value_overwrites_list_with_string() {
        let mut doc = parse("[S]\nk = a, b\n").unwrap();
        set_value(&mut doc, &path("[S]"), "k", "a, b").unwrap();
        assert_eq!(get_value(&doc, &path("[S]"), "k"), Some(&scalar("a, b")));
    }

    #[test]
    fn test_set_value_replaces_subsection() {
        let mut doc = parse("[S]\n[[k]]\nx = 1\n").unwrap();
        set_value(&mut doc, &path("[S]"), "k", "flat").unwrap();
        assert_eq!(get_value(&doc, &path("[S]"), "k"), Some(&scalar("flat")));
    }

    #[test]
    fn test_set_value_through_scalar_is_conflict() {
        let mut doc = parse("[S]\nk = 1\n").unwrap();
        let err = set_value(&mut doc, &path("[S][k]"), "x", "1").unwrap_err();
        assert!(matches!(err, Error::TypeConflict(_)));
    }

    #[test]
    fn test_create_section_is_idempotent() {
        let mut doc = parse("[A]\n[[B]]\nx = 1\n").unwrap();
        create_section(&mut doc, &path("[A][B]")).unwrap();
        create_section(&mut doc, &path("[A][B]")).unwrap();
        let b = find_section(&doc, &path("[A][B]")).unwrap();
        assert_eq!(b.get("x"), Some(&scalar("1")));

        create_section(&mut doc, &path("[StdReport][BelchertownReport]")).unwrap();
        assert!(has_section(&doc, &path("[StdReport][BelchertownReport]")));
    }

    #[test]
    fn test_remove_top_level_section() {
        let mut doc = parse("[A]\nx = 1\n[B]\n").unwrap();
        assert!(remove_section(&mut doc, &path("[A]")).unwrap());
        assert!(!doc.contains_key("A"));
        assert!(doc.contains_key("B"));
    }

    #[test]
    fn test_remove_nested_section() {
        let mut doc = parse("[StdReport]\n[[BelchertownReport]]\nskin = B\n[[Other]]\n").unwrap();
        assert!(remove_section(&mut doc, &path("[StdReport][BelchertownReport]")).unwrap());
        let report = doc.section("StdReport").unwrap();
        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["Other"]);
    }

    #[test]
    fn test_remove_missing_section_leaves_document() {
        let mut doc = parse("[StdReport]\nx = 1\n").unwrap();
        let before = doc.clone();
        assert!(!remove_section(&mut doc, &path("[StdReport][BelchertownReport]")).unwrap());
        assert!(!remove_section(&mut doc, &path("[Missing][Child]")).unwrap());
        assert!(!remove_section(&mut doc, &path("[Missing]")).unwrap());
        assert_eq!(doc, before);
        assert!(!doc.contains_key("Missing"));
    }

    #[test]
    fn test_remove_section_also_removes_values() {
        let mut doc = parse("top = 1\n[A]\nx = 1\ny = 2\n").unwrap();
        assert!(remove_section(&mut doc, &path("[top]")).unwrap());
        assert!(remove_section(&mut doc, &path("[A][x]")).unwrap());
        assert!(!doc.contains_key("top"));
        assert_eq!(doc.section("A").unwrap().keys().collect::<Vec<_>>(), vec!["y"]);
        assert!(!remove_section(&mut doc, &path("[A][y][z]")).unwrap());
    }

    #[test]
    fn test_parse_pairs_splits_on_first_equals() {
        let pairs = parse_pairs(&["a=1", "b=2=3", " c = spaced ", "d="]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2=3".to_string()),
                ("c".to_string(), "spaced".to_string()),
                ("d".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_pairs_rejects_malformed() {
        for bad in ["novalue", "=value"] {
            let err = parse_pairs(&[bad]).unwrap_err();
            assert!(matches!(err, Error::MalformedPair(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_set_multiple_values() {
        let mut doc = Document::new();
        let count = set_multiple_values(&mut doc, &path("[X]"), &["a=1", "b=2=3"]).unwrap();
        assert_eq!(count, 2);
        assert_eq!(get_value(&doc, &path("[X]"), "a"), Some(&scalar("1")));
        assert_eq!(get_value(&doc, &path("[X]"), "b"), Some(&scalar("2=3")));
    }

    #[test]
    fn test_set_multiple_values_is_atomic() {
        let mut doc = parse("[X]\na = old\n").unwrap();
        let before = doc.clone();
        let err = set_multiple_values(&mut doc, &path("[X][Y]"), &["a=new", "broken"]).unwrap_err();
        assert!(matches!(err, Error::MalformedPair(_)));
        assert_eq!(doc, before);
    }
}
