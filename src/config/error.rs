//! Error types for configuration operations.

use std::io;

/// Error type for configuration operations.
///
/// Absence of a section or key is never an error: lookups return `Option`
/// or `bool` and the caller decides what it means.
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(String),
    /// Malformed configuration text
    Parse(String),
    /// Malformed section path
    Path(String),
    /// A path segment or merge target names a scalar where a section is required
    TypeConflict(String),
    /// Merge source does not have exactly one root section
    MultipleRoots(String),
    /// Merge source root does not match the target path
    RootMismatch(String),
    /// `key=value` pair without `=`
    MalformedPair(String),
    /// Value that cannot be written back in the text format
    Serialize(String),
}

impl Error {
    /// Parse error located at a 1-based line number.
    pub fn parse_at(line: usize, message: impl std::fmt::Display) -> Self {
        Error::Parse(format!("line {}: {}", line, message))
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(e)
            | Error::Parse(e)
            | Error::Path(e)
            | Error::TypeConflict(e)
            | Error::MultipleRoots(e)
            | Error::RootMismatch(e)
            | Error::MalformedPair(e)
            | Error::Serialize(e) => write!(f, "{}", e),
        }
    }
}
