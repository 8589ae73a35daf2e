//! Error taxonomy for the citation pipeline
//!
//! Configuration and serialization failures abort the run; rendering
//! failures abort only the final formatting step. Per-package resolution
//! failures are not errors at all: they degrade to synthetic records and
//! are reported through `ResolutionReport`.

use std::path::PathBuf;

/// Fatal pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum CitationError {
    /// Invalid caller input (unknown output mode, missing provider for the
    /// requested selection). Raised before any work begins.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The bibliography (or template) file could not be written. No partial
    /// file is left behind.
    #[error("failed to write {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The selection source (project scan or session listing) failed
    /// outright, so there is no package set to work with.
    #[error("package discovery via {origin} failed: {message}")]
    Discovery { origin: String, message: String },

    /// The external document renderer failed for one specific format. The
    /// bibliography written earlier in the run remains valid.
    #[error("rendering to {format} failed: {message}")]
    Render { format: String, message: String },
}

/// Failure surfaced by an external provider
///
/// Metadata lookups degrade per package instead of aborting the run;
/// scanner and renderer failures are promoted to `CitationError` by the
/// entry point.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unavailable(String),

    #[error("unparseable provider output: {0}")]
    Parse(String),
}
