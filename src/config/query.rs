//! Read-only queries. None of these create missing structure.

use super::document::{Node, Section};
use super::path::{find_section, SectionPath};

/// Value of `key` in the section at `path`.
pub fn get_value<'a>(root: &'a Section, path: &SectionPath, key: &str) -> Option<&'a Node> {
    find_section(root, path).and_then(|section| section.get(key))
}

/// Like [`get_value`], falling back to `default` when the section or key
/// is missing. An unset default keeps "absent" apart from "empty".
pub fn get_value_or<'a>(
    root: &'a Section,
    path: &SectionPath,
    key: &str,
    default: Option<&'a Node>,
) -> Option<&'a Node> {
    get_value(root, path, key).or(default)
}

pub fn has_section(root: &Section, path: &SectionPath) -> bool {
    find_section(root, path).is_some()
}

/// Whether `key` exists in the section at `path`, as a value or subsection.
pub fn has_key(root: &Section, path: &SectionPath, key: &str) -> bool {
    find_section(root, path).is_some_and(|section| section.contains_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse::parse;
    use indoc::indoc;

    fn path(s: &str) -> SectionPath {
        s.parse().unwrap()
    }

    fn doc() -> crate::config::Document {
        parse(indoc! {"
            [Station]
                location = Test Site
                empty = \"\"
                units = a, b
                [[GW1000]]
                    ip = 10.0.0.2
        "})
        .unwrap()
    }

    #[test]
    fn test_get_value_scalar_and_list() {
        let doc = doc();
        assert_eq!(
            get_value(&doc, &path("[Station]"), "location"),
            Some(&Node::Scalar("Test Site".into()))
        );
        assert_eq!(
            get_value(&doc, &path("[Station]"), "units"),
            Some(&Node::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            get_value(&doc, &path("[Station][GW1000]"), "ip"),
            Some(&Node::Scalar("10.0.0.2".into()))
        );
    }

    #[test]
    fn test_get_value_empty_is_not_absent() {
        let doc = doc();
        assert_eq!(
            get_value(&doc, &path("[Station]"), "empty"),
            Some(&Node::Scalar(String::new()))
        );
        assert_eq!(get_value(&doc, &path("[Station]"), "missing"), None);
    }

    #[test]
    fn test_get_value_or_default() {
        let doc = doc();
        let fallback = Node::Scalar("fallback".into());
        assert_eq!(
            get_value_or(&doc, &path("[Nowhere]"), "x", Some(&fallback)),
            Some(&fallback)
        );
        assert_eq!(
            get_value_or(&doc, &path("[Station]"), "location", Some(&fallback)),
            Some(&Node::Scalar("Test Site".into()))
        );
        assert_eq!(get_value_or(&doc, &path("[Station]"), "nope", None), None);
    }

    #[test]
    fn test_has_section() {
        let doc = doc();
        assert!(has_section(&doc, &path("[Station]")));
        assert!(has_section(&doc, &path("[Station][GW1000]")));
        assert!(!has_section(&doc, &path("[Station][location]")));
        assert!(!has_section(&doc, &path("[StdReport]")));
    }

    #[test]
    fn test_has_key() {
        let doc = doc();
        assert!(has_key(&doc, &path("[Station]"), "location"));
        assert!(has_key(&doc, &path("[Station]"), "GW1000"));
        assert!(!has_key(&doc, &path("[Station]"), "nope"));
        assert!(!has_key(&doc, &path("[Missing]"), "location"));
    }

    #[test]
    fn test_queries_do_not_create() {
        let doc = doc();
        let before = doc.clone();
        let _ = get_value(&doc, &path("[A][B]"), "k");
        let _ = has_key(&doc, &path("[A][B]"), "k");
        assert_eq!(doc, before);
        assert!(!doc.contains_key("A"));
    }
}
