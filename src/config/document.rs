//! In-memory model of a configuration document.
//!
//! A [`Document`] owns a root [`Section`]. Sections map key names to
//! [`Entry`] values, each carrying a [`Node`] (scalar, list or nested
//! section) and the [`Decor`] needed to write it back the way it was read.

use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

// =============================================================================
// Nodes
// =============================================================================

/// Value stored under a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Single string value
    Scalar(String),
    /// Comma-separated list of strings
    List(Vec<String>),
    /// Nested section
    Section(Section),
}

impl Node {
    pub fn is_section(&self) -> bool {
        matches!(self, Node::Section(_))
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(section) => Some(section),
            _ => None,
        }
    }

    /// Human readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::List(_) => "list",
            Node::Section(_) => "section",
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(value)
    }
}

// =============================================================================
// Formatting metadata
// =============================================================================

/// Formatting attached to an entry.
#[derive(Debug, Clone, Default)]
pub struct Decor {
    /// Comment and blank lines written before the entry, verbatim.
    pub comments: Vec<String>,
    /// Trailing `# comment` on the entry's line.
    pub inline: Option<String>,
    /// Source lines of the entry, reused while the node is unmodified.
    pub(crate) raw: Option<Vec<String>>,
}

// =============================================================================
// Entry
// =============================================================================

/// A node together with its formatting.
#[derive(Debug, Clone)]
pub struct Entry {
    pub node: Node,
    pub decor: Decor,
}

impl Entry {
    /// Forget source lines of this entry and everything below it.
    ///
    /// Needed when an entry is moved to another place in the tree, where
    /// its original indentation and bracket depth no longer apply.
    pub(crate) fn strip_raw(&mut self) {
        self.decor.raw = None;
        if let Node::Section(section) = &mut self.node {
            for entry in section.entries.values_mut() {
                entry.strip_raw();
            }
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

// =============================================================================
// Section
// =============================================================================

/// Ordered mapping of unique key names to entries.
///
/// All leaves (scalars and lists) come before all subsections, mirroring
/// the text format where every key after a section header belongs to that
/// section.
#[derive(Debug, Clone, Default)]
pub struct Section {
    entries: IndexMap<String, Entry>,
}

impl PartialEq for Section {
    // IndexMap equality ignores order; documents do not.
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, a), (kb, b))| ka == kb && a == b)
    }
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key).map(|entry| &entry.node)
    }

    /// Mutable access to the node under `key`.
    ///
    /// A leaf handed out this way forgets its source lines, so whatever
    /// the caller writes is rendered on save.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key).map(|entry| {
            if !entry.node.is_section() {
                entry.decor.raw = None;
            }
            &mut entry.node
        })
    }

    pub fn get_entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    /// Subsection named `name`, if there is one.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.get(name).and_then(Node::as_section)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, Entry)> {
        self.entries.into_iter()
    }

    /// Number of scalars and lists, which always lead the section.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .take_while(|entry| !entry.node.is_section())
            .count()
    }

    /// Insert or overwrite `key` with `node`.
    ///
    /// Comments of an overwritten entry are kept, its source lines are not.
    pub fn set(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        let decor = match self.entries.get_mut(&key) {
            Some(old) => Decor {
                raw: None,
                ..std::mem::take(&mut old.decor)
            },
            None => Decor::default(),
        };
        self.insert_entry(key, Entry { node, decor });
    }

    /// Insert a complete entry, keeping leaves ahead of subsections.
    ///
    /// An existing entry of the same kind is replaced in place; one of the
    /// other kind is removed first and the new entry is placed as if new.
    pub fn insert_entry(&mut self, key: String, entry: Entry) {
        let is_section = entry.node.is_section();
        if let Some(index) = self.entries.get_index_of(&key) {
            let same_kind = self
                .entries
                .get_index(index)
                .is_some_and(|(_, old)| old.node.is_section() == is_section);
            if same_kind {
                if let Some((_, slot)) = self.entries.get_index_mut(index) {
                    *slot = entry;
                }
                return;
            }
            self.entries.shift_remove_index(index);
        }
        if is_section {
            self.entries.insert(key, entry);
        } else {
            let at = self.leaf_count();
            self.entries.shift_insert(at, key, entry);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key).map(|entry| entry.node)
    }
}

// =============================================================================
// Document
// =============================================================================

/// File-level layout details.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Line terminator, `"\n"` or `"\r\n"`.
    pub newline: &'static str,
    /// Whether the file started with a UTF-8 byte order mark.
    pub bom: bool,
    /// One level of indentation for rendered entries.
    pub indent: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            newline: "\n",
            bom: false,
            indent: "    ".to_string(),
        }
    }
}

/// Root of a configuration tree.
///
/// Derefs to its root [`Section`], so section operations apply directly.
#[derive(Debug, Clone, Default)]
pub struct Document {
    root: Section,
    pub initial_comments: Vec<String>,
    pub final_comments: Vec<String>,
    pub layout: Layout,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        root: Section,
        initial_comments: Vec<String>,
        final_comments: Vec<String>,
        layout: Layout,
    ) -> Self {
        Self {
            root,
            initial_comments,
            final_comments,
            layout,
        }
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn into_root(self) -> Section {
        self.root
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Deref for Document {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.root
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Section {
        &mut self.root
    }
}

impl std::str::FromStr for Document {
    type Err = super::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse::parse(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
