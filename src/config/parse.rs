//! Parser for ConfigObj-style INI text.
//!
//! Sections nest by bracket depth (`[a]`, `[[b]]`, `[[[c]]]`), keys are
//! `name = value`, values may be quoted, triple-quoted (possibly spanning
//! lines) or comma-separated lists. Comments start with `#`.

use std::sync::OnceLock;

use regex::Regex;

use super::document::{Decor, Document, Entry, Layout, Node, Section};
use super::error::Error;

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\s*)(\[+)\s*("[^"]*"|'[^']*'|.*?)\s*(\]+)\s*(#.*)?$"#)
            .expect("valid section header regex")
    })
}

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\s*)("[^"]*"|'[^']*'|[^"'=\s][^=]*?)\s*=\s*(.*)$"#)
            .expect("valid key regex")
    })
}

/// Parse configuration text into a [`Document`].
pub fn parse(text: &str) -> Result<Document, Error> {
    let (text, bom) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let mut lines: Vec<&str> = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    };
    if text.ends_with('\n') {
        lines.pop();
    }

    let mut parser = Parser::new(lines);
    let initial_comments = parser.initial_comments();
    let mut root = Section::new();
    parser.parse_body(&mut root, 0)?;

    let layout = Layout {
        newline,
        bom,
        indent: parser.indent.unwrap_or_else(|| Layout::default().indent),
    };
    Ok(Document::from_parts(
        root,
        initial_comments,
        parser.pending,
        layout,
    ))
}

/// Parsed `[..[name]..]` line.
struct Header {
    depth: usize,
    name: String,
    indent: String,
    comment: Option<String>,
}

/// Represents an on-going parse.
struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    /// Comment and blank lines waiting for the next entry.
    pending: Vec<String>,
    /// Indentation unit, from the first indented entry.
    indent: Option<String>,
}

impl<'a> Parser<'a> {
    fn new(lines: Vec<&'a str>) -> Self {
        Self {
            lines,
            pos: 0,
            pending: Vec::new(),
            indent: None,
        }
    }

    /// Split off the comment block heading the file.
    ///
    /// Everything up to the last blank line of the leading comment block
    /// belongs to the file; comments directly above the first entry stay
    /// with that entry.
    fn initial_comments(&mut self) -> Vec<String> {
        let block = self
            .lines
            .iter()
            .take_while(|line| is_comment_or_blank(line))
            .count();
        let end = if block == self.lines.len() {
            block
        } else {
            match self.lines[..block]
                .iter()
                .rposition(|line| line.trim().is_empty())
            {
                Some(last_blank) => last_blank + 1,
                None => 0,
            }
        };
        self.pos = end;
        self.lines[..end].iter().map(|l| l.to_string()).collect()
    }

    /// Read keys and subsections of `section` until a header at `depth` or
    /// shallower, or the end of input.
    fn parse_body(&mut self, section: &mut Section, depth: usize) -> Result<(), Error> {
        while let Some(&line) = self.lines.get(self.pos) {
            if is_comment_or_blank(line) {
                self.pending.push(line.to_string());
                self.pos += 1;
                continue;
            }

            if line.trim_start().starts_with('[') {
                let line_no = self.pos + 1;
                let header = parse_header(line, line_no)?;
                if header.depth <= depth {
                    return Ok(());
                }
                if header.depth > depth + 1 {
                    return Err(Error::parse_at(
                        line_no,
                        format!(
                            "section [{}] is nested too deeply (depth {} inside depth {})",
                            header.name, header.depth, depth
                        ),
                    ));
                }
                self.pos += 1;
                self.detect_indent(&header.indent, header.depth - 1);
                let decor = Decor {
                    comments: std::mem::take(&mut self.pending),
                    inline: header.comment,
                    raw: Some(vec![line.to_string()]),
                };
                self.open_section(section, header.name, decor, header.depth, line_no)?;
                continue;
            }

            self.parse_entry(section, depth)?;
        }
        Ok(())
    }

    fn open_section(
        &mut self,
        parent: &mut Section,
        name: String,
        decor: Decor,
        depth: usize,
        line_no: usize,
    ) -> Result<(), Error> {
        match parent.get_entry_mut(&name) {
            Some(Entry {
                node: Node::Section(existing),
                ..
            }) => {
                log::warn!(
                    "line {}: section [{}] declared twice, merging its entries",
                    line_no,
                    name
                );
                // The repeated header is not written back, its comments
                // move to the next entry.
                self.pending = decor.comments;
                self.pending.extend(decor.inline);
                self.parse_body(existing, depth)
            }
            Some(entry) => Err(Error::parse_at(
                line_no,
                format!(
                    "section [{}] clashes with an existing {} of the same name",
                    name,
                    entry.node.kind()
                ),
            )),
            None => {
                log::trace!("line {}: opening section [{}] at depth {}", line_no, name, depth);
                let mut child = Section::new();
                self.parse_body(&mut child, depth)?;
                parent.insert_entry(
                    name,
                    Entry {
                        node: Node::Section(child),
                        decor,
                    },
                );
                Ok(())
            }
        }
    }

    fn parse_entry(&mut self, section: &mut Section, depth: usize) -> Result<(), Error> {
        let line_no = self.pos + 1;
        let line = self.lines[self.pos];
        let caps = key_re().captures(line).ok_or_else(|| {
            Error::parse_at(line_no, format!("invalid line '{}'", line.trim()))
        })?;
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let key = unquote(&caps[2]).to_string();
        let rest = caps.get(3).map_or("", |m| m.as_str());
        self.pos += 1;
        self.detect_indent(indent, depth);

        let mut raw = vec![line.to_string()];
        let (node, inline) = self.parse_value(rest, line_no, &mut raw)?;

        match section.get(&key) {
            Some(Node::Section(_)) => {
                return Err(Error::parse_at(
                    line_no,
                    format!("key '{}' clashes with a section of the same name", key),
                ));
            }
            Some(_) => log::warn!(
                "line {}: duplicate key '{}', keeping the last value",
                line_no,
                key
            ),
            None => {}
        }

        section.insert_entry(
            key,
            Entry {
                node,
                decor: Decor {
                    comments: std::mem::take(&mut self.pending),
                    inline,
                    raw: Some(raw),
                },
            },
        );
        Ok(())
    }

    fn parse_value(
        &mut self,
        rest: &str,
        line_no: usize,
        raw: &mut Vec<String>,
    ) -> Result<(Node, Option<String>), Error> {
        for delim in TRIPLE_QUOTES {
            if let Some(body) = rest.strip_prefix(delim) {
                return self.parse_triple_quoted(body, delim, line_no, raw);
            }
        }
        parse_scalar_or_list(rest).map_err(|msg| Error::parse_at(line_no, msg))
    }

    fn parse_triple_quoted(
        &mut self,
        body: &str,
        delim: &str,
        line_no: usize,
        raw: &mut Vec<String>,
    ) -> Result<(Node, Option<String>), Error> {
        if let Some(end) = body.find(delim) {
            let inline = trailing_comment(&body[end + delim.len()..])
                .map_err(|msg| Error::parse_at(line_no, msg))?;
            return Ok((Node::Scalar(body[..end].to_string()), inline));
        }

        let mut content = body.to_string();
        while let Some(&line) = self.lines.get(self.pos) {
            self.pos += 1;
            raw.push(line.to_string());
            content.push('\n');
            if let Some(end) = line.find(delim) {
                content.push_str(&line[..end]);
                let inline = trailing_comment(&line[end + delim.len()..])
                    .map_err(|msg| Error::parse_at(self.pos, msg))?;
                return Ok((Node::Scalar(content), inline));
            }
            content.push_str(line);
        }
        Err(Error::parse_at(line_no, "unterminated triple-quoted value"))
    }

    fn detect_indent(&mut self, indent: &str, depth: usize) {
        if self.indent.is_some() || indent.is_empty() || depth == 0 {
            return;
        }
        let width = indent.chars().count();
        if width % depth == 0 {
            self.indent = Some(indent.chars().take(width / depth).collect());
        }
    }
}

fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_header(line: &str, line_no: usize) -> Result<Header, Error> {
    let caps = header_re().captures(line).ok_or_else(|| {
        let reason = if line.contains(']') {
            "invalid section header"
        } else {
            "unterminated section header"
        };
        Error::parse_at(line_no, format!("{} '{}'", reason, line.trim()))
    })?;

    let open = caps[2].len();
    let close = caps[4].len();
    if open != close {
        return Err(Error::parse_at(
            line_no,
            format!("mismatched brackets in section header '{}'", line.trim()),
        ));
    }

    let name = unquote(&caps[3]);
    if name.is_empty() {
        return Err(Error::parse_at(line_no, "empty section name"));
    }

    Ok(Header {
        depth: open,
        name: name.to_string(),
        indent: caps[1].to_string(),
        comment: caps.get(5).map(|m| m.as_str().trim_end().to_string()),
    })
}

/// Strip one pair of matching quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Whatever follows a value must be empty or a comment.
fn trailing_comment(rest: &str) -> Result<Option<String>, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(None)
    } else if rest.starts_with('#') {
        Ok(Some(rest.to_string()))
    } else {
        Err(format!("unexpected text '{}' after quoted value", rest))
    }
}

/// Parse a single-line value: a scalar, or a list when a comma appears
/// outside quotes.
fn parse_scalar_or_list(value: &str) -> Result<(Node, Option<String>), String> {
    let value = value.trim();

    // A lone comma is the empty list.
    if let Some(after) = value.strip_prefix(',') {
        return Ok((Node::List(Vec::new()), trailing_comment(after)?));
    }

    let mut items: Vec<String> = Vec::new();
    let mut is_list = false;
    let mut inline = None;
    let mut rest = value;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.starts_with('#') {
            inline = Some(rest.trim_end().to_string());
            break;
        }

        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        let after = match quote {
            Some(quote) => {
                let body = &rest[1..];
                let end = body
                    .find(quote)
                    .ok_or_else(|| format!("unterminated quoted value {}", rest))?;
                items.push(body[..end].to_string());
                &body[end + 1..]
            }
            None => {
                let end = rest.find([',', '#']).unwrap_or(rest.len());
                let item = rest[..end].trim_end();
                if item.is_empty() {
                    return Err(format!("empty list item in '{}'", value));
                }
                items.push(item.to_string());
                &rest[end..]
            }
        };

        let after = after.trim_start();
        if let Some(next) = after.strip_prefix(',') {
            is_list = true;
            rest = next;
            continue;
        }
        if after.is_empty() {
            break;
        }
        if after.starts_with('#') {
            inline = Some(after.trim_end().to_string());
            break;
        }
        return Err(format!("unexpected text '{}' after quoted value", after));
    }

    let node = if is_list {
        Node::List(items)
    } else {
        Node::Scalar(items.pop().unwrap_or_default())
    };
    Ok((node, inline))
}

// =============================================================================
// Unit Tests
// =============================================================================
