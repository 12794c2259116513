//! Output handling for configuration values and command messages.

use colored::*;
use similar::{ChangeTag, TextDiff};

use crate::config::{self, Node};

// =============================================================================
// ConfigOutput Trait
// =============================================================================

/// Types that can be printed either raw or in config file syntax.
pub trait ConfigOutput {
    /// Serialize the way it would appear in a config file.
    fn to_syntax_string(&self) -> Result<String, config::Error>;

    /// Unquoted scalars, list items joined with `, `.
    fn to_raw_string(&self) -> Result<String, config::Error>;

    fn format(&self, syntax: bool) -> Result<String, config::Error> {
        if syntax {
            self.to_syntax_string()
        } else {
            self.to_raw_string()
        }
    }
}

impl ConfigOutput for Node {
    fn to_syntax_string(&self) -> Result<String, config::Error> {
        match self {
            Node::Section(section) => config::serialize_section(section),
            leaf => config::format_value(leaf),
        }
    }

    fn to_raw_string(&self) -> Result<String, config::Error> {
        match self {
            Node::Scalar(s) => Ok(s.clone()),
            Node::List(items) => Ok(items.join(", ")),
            Node::Section(section) => config::serialize_section(section),
        }
    }
}

/// Print a value followed by a newline unless it already ends with one.
pub fn print_value<T: ConfigOutput>(value: &T, syntax: bool) -> Result<(), config::Error> {
    let text = value.format(syntax)?;
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
    Ok(())
}

// =============================================================================
// Reporter
// =============================================================================

/// Prints informational messages, silenced by `--quiet`.
#[derive(Clone, Copy, Debug)]
pub struct Reporter {
    pub quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    pub fn flag(&self, value: bool) {
        self.info(if value { "true" } else { "false" });
    }
}

// =============================================================================
// Diff
// =============================================================================

/// Unified diff between the saved and pending text, colored when enabled.
pub fn render_diff(old: &str, new: &str, name: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();
    out.push_str(&format!("{}\n", format!("--- {}", name).as_str().bold()));
    out.push_str(&format!("{}\n", format!("+++ {} (pending)", name).as_str().bold()));
    for group in diff.grouped_ops(3) {
        let (first, last) = match (group.first(), group.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        out.push_str(&format!(
            "{}\n",
            format!(
                "@@ -{},{} +{},{} @@",
                old_range.start + 1,
                old_range.len(),
                new_range.start + 1,
                new_range.len()
            )
            .as_str()
            .cyan()
        ));
        for op in &group {
            for change in diff.iter_changes(op) {
                let mut line = change.to_string_lossy().into_owned();
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                let rendered = match change.tag() {
                    ChangeTag::Delete => format!("-{}", line).as_str().red().to_string(),
                    ChangeTag::Insert => format!("+{}", line).as_str().green().to_string(),
                    ChangeTag::Equal => format!(" {}", line),
                };
                out.push_str(&rendered);
            }
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
