//! ConfigObj-style configuration documents.
//!
//! # Module Organization
//!
//! - [`error`]: Error type for configuration operations
//! - [`document`]: Document, section and node model
//! - [`parse`]: Text to document
//! - [`serialize`]: Document to text, keeping the source layout
//! - [`path`]: `[A][B]` section paths and their resolution
//! - [`query`]: Read-only lookups (get, has-section, has-key)
//! - [`mutation`]: Set, create, remove and bulk assignment
//! - [`merge`]: Recursive overlay of one configuration onto another

mod document;
mod error;
mod merge;
mod mutation;
mod parse;
mod path;
mod query;
mod serialize;

pub use document::{Document, Node, Section};
pub use error::Error;

pub use merge::{merge_from_file, merge_from_text};
pub use mutation::{create_section, remove_section, set_multiple_values, set_value};
pub use path::SectionPath;
pub use query::{get_value_or, has_key, has_section};
pub use serialize::{format_value, serialize, serialize_section};
