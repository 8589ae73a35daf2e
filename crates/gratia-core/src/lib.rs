//! gratia-core: cite the packages a project uses
//!
//! The pipeline: expand the requested package set (scan, session, or
//! explicit list; optional dependency closure; group folding), resolve
//! citation metadata per package through an injected provider, deduplicate
//! records by content fingerprint and assign citekeys, write the BibTeX
//! bibliography, and project the result as a paragraph, a table, a citekey
//! list, or a rendered report document.
//!
//! All contact with the outside world goes through the traits in
//! [`providers`]; the pipeline itself is deterministic given fixed
//! provider responses.

pub mod bibliography;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod expand;
pub mod normalize;
pub mod providers;
pub mod render;
pub mod report;
pub mod resolve;

pub use bibliography::write_bibliography;
pub use dedup::finalize;
pub use domain::{
    CitationKey, CitationRecord, CitationRole, PackageCitation, PackageRequest, PackageTable,
};
pub use error::{CitationError, ProviderError};
pub use expand::{expand, ExpandOptions, GroupDefinition, PackageSelection, BASE_RUNTIME, IDE_NAME};
pub use normalize::Fingerprint;
pub use providers::{
    DependencyGraph, DocumentRenderer, GraphOptions, MetadataProvider, Providers, SessionSource,
    UsageScanner,
};
pub use render::{PackageRow, RenderFormat};
pub use report::{cite_packages, CitationRequest, Citations, Output, OutputMode};
pub use resolve::{ResolutionReport, Resolver};
