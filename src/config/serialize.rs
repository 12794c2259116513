//! Serialization of documents back to ConfigObj-style text.
//!
//! Entries that still carry their source lines are written verbatim, so
//! an untouched document is reproduced as it was read. Everything else is
//! rendered canonically with minimal quoting.

use super::document::{Document, Entry, Layout, Node, Section};
use super::error::Error;

// =============================================================================
// Public API
// =============================================================================

/// Serialize a whole document.
pub fn serialize(doc: &Document) -> Result<String, Error> {
    let mut writer = Writer::new(&doc.layout, true);
    if doc.layout.bom {
        writer.out.push('\u{feff}');
    }
    for line in &doc.initial_comments {
        writer.line(line);
    }
    writer.section_body(doc.root(), 0)?;
    for line in &doc.final_comments {
        writer.line(line);
    }
    Ok(writer.out)
}

/// Serialize a section body as a standalone fragment.
///
/// Source lines are ignored: the fragment is rendered from the top level
/// regardless of where the section sits in its document.
pub fn serialize_section(section: &Section) -> Result<String, Error> {
    let layout = Layout::default();
    let mut writer = Writer::new(&layout, false);
    writer.section_body(section, 0)?;
    Ok(writer.out)
}

/// Render a leaf value the way it appears after `key = `.
pub fn format_value(node: &Node) -> Result<String, Error> {
    match node {
        Node::Scalar(s) => quote_value(s, true),
        Node::List(items) => {
            let quoted = items
                .iter()
                .map(|item| quote_value(item, false))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match quoted.len() {
                0 => ",".to_string(),
                1 => format!("{},", quoted[0]),
                _ => quoted.join(", "),
            })
        }
        Node::Section(_) => Err(Error::Serialize(
            "a section cannot be written as a value".to_string(),
        )),
    }
}

// =============================================================================
// Writer
// =============================================================================

struct Writer<'a> {
    out: String,
    layout: &'a Layout,
    /// Reuse source lines of unmodified entries.
    verbatim: bool,
    lines: usize,
}

impl<'a> Writer<'a> {
    fn new(layout: &'a Layout, verbatim: bool) -> Self {
        Self {
            out: String::new(),
            layout,
            verbatim,
            lines: 0,
        }
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push_str(self.layout.newline);
        self.lines += 1;
    }

    fn raw<'e>(&self, entry: &'e Entry) -> Option<&'e Vec<String>> {
        if self.verbatim {
            entry.decor.raw.as_ref()
        } else {
            None
        }
    }

    fn section_body(&mut self, section: &Section, depth: usize) -> Result<(), Error> {
        for (key, entry) in section.iter() {
            if self.raw(entry).is_some() {
                for comment in &entry.decor.comments {
                    self.line(comment);
                }
            } else {
                // Rendered entries may have moved; comments follow their depth.
                let indent = self.layout.indent.repeat(depth);
                for comment in &entry.decor.comments {
                    let comment = comment.trim_start();
                    if comment.is_empty() {
                        self.line("");
                    } else {
                        self.line(&format!("{}{}", indent, comment));
                    }
                }
            }
            match &entry.node {
                Node::Section(child) => {
                    self.header(key, entry, depth + 1)?;
                    self.section_body(child, depth + 1)?;
                }
                leaf => self.leaf(key, entry, leaf, depth)?,
            }
        }
        Ok(())
    }

    fn header(&mut self, name: &str, entry: &Entry, depth: usize) -> Result<(), Error> {
        if let Some(raw) = self.raw(entry) {
            for line in raw {
                self.line(line);
            }
            return Ok(());
        }
        if depth == 1 && entry.decor.comments.is_empty() && self.lines > 0 {
            self.line("");
        }
        let mut line = format!(
            "{}{}{}{}",
            self.layout.indent.repeat(depth - 1),
            "[".repeat(depth),
            quote_section_name(name)?,
            "]".repeat(depth)
        );
        push_inline(&mut line, entry);
        self.line(&line);
        Ok(())
    }

    fn leaf(&mut self, key: &str, entry: &Entry, node: &Node, depth: usize) -> Result<(), Error> {
        if let Some(raw) = self.raw(entry) {
            for line in raw {
                self.line(line);
            }
            return Ok(());
        }
        let mut line = format!(
            "{}{} = {}",
            self.layout.indent.repeat(depth),
            quote_key(key)?,
            format_value(node)?
        );
        push_inline(&mut line, entry);
        self.line(&line);
        Ok(())
    }
}

fn push_inline(line: &mut String, entry: &Entry) {
    if let Some(comment) = &entry.decor.inline {
        line.push(' ');
        line.push_str(comment);
    }
}

// =============================================================================
// Quoting
// =============================================================================

fn triple_quote(s: &str) -> Option<String> {
    for delim in ["\"\"\"", "'''"] {
        let last = delim.chars().next().unwrap_or('"');
        if !s.contains(delim) && !s.ends_with(last) {
            return Some(format!("{}{}{}", delim, s, delim));
        }
    }
    None
}

fn quote_value(s: &str, allow_multiline: bool) -> Result<String, Error> {
    if s.is_empty() {
        return Ok("\"\"".to_string());
    }

    if s.contains('\n') {
        if !allow_multiline {
            return Err(Error::Serialize(format!(
                "list item {:?} cannot contain a newline",
                s
            )));
        }
        return triple_quote(s)
            .ok_or_else(|| Error::Serialize(format!("value {:?} cannot be quoted", s)));
    }

    let needs_quotes =
        s != s.trim() || s.contains([',', '#']) || s.starts_with(['"', '\'']);
    if !needs_quotes {
        return Ok(s.to_string());
    }
    if !s.contains('"') {
        return Ok(format!("\"{}\"", s));
    }
    if !s.contains('\'') {
        return Ok(format!("'{}'", s));
    }
    if allow_multiline {
        if let Some(quoted) = triple_quote(s) {
            return Ok(quoted);
        }
    }
    Err(Error::Serialize(format!("value {:?} cannot be quoted", s)))
}

fn quote_name(name: &str, needs_quotes: bool, what: &str) -> Result<String, Error> {
    if !needs_quotes {
        Ok(name.to_string())
    } else if !name.contains('"') {
        Ok(format!("\"{}\"", name))
    } else if !name.contains('\'') {
        Ok(format!("'{}'", name))
    } else {
        Err(Error::Serialize(format!("{} {:?} cannot be quoted", what, name)))
    }
}

fn quote_key(key: &str) -> Result<String, Error> {
    if key.contains('\n') {
        return Err(Error::Serialize(format!(
            "key {:?} cannot contain a newline",
            key
        )));
    }
    let needs_quotes = key.is_empty()
        || key != key.trim()
        || key.contains(['=', '#'])
        || key.starts_with(['"', '\'', '[']);
    quote_name(key, needs_quotes, "key")
}

fn quote_section_name(name: &str) -> Result<String, Error> {
    if name.is_empty() || name.contains('\n') {
        return Err(Error::Serialize(format!(
            "invalid section name {:?}",
            name
        )));
    }
    let needs_quotes =
        name != name.trim() || name.contains(['[', ']', '#']) || name.starts_with(['"', '\'']);
    quote_name(name, needs_quotes, "section name")
}

// =============================================================================
// Unit Tests
// =============================================================================
