//! BibTeX support for the gratia citation pipeline
//!
//! This crate provides:
//! - An entry model (`Entry`, `EntryKind`, `Field`)
//! - A nom-based parser for BibTeX text returned by metadata providers
//! - A formatter that writes entries with proper value delimiting and
//!   escaping
//!
//! It knows nothing about packages or bibliographies as a whole; the
//! pipeline in `gratia-core` decides which entries exist and in what order.

pub mod entry;
pub mod format;
pub mod parser;

pub use entry::{Entry, EntryKind, Field};
pub use format::{escape_value, format_entries, format_entry};
pub use parser::{parse_entries, parse_one, ParseError, ParseIssue, ParseOutcome};
