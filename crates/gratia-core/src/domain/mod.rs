//! Domain model for the citation pipeline
//!
//! - `PackageRequest`: one requested package, possibly with a version floor
//! - `CitationRecord`: one bibliographic entry with its content fingerprint
//! - `PackageCitation`: one package identity with its ordered records
//! - `PackageTable`: the final ordered, deduplicated table

pub mod package;
pub mod record;
pub mod table;

pub use package::{CitationRole, PackageRequest};
pub use record::{CitationKey, CitationRecord};
pub use table::{PackageCitation, PackageTable};
