//! External collaborators, injected as trait objects
//!
//! The pipeline never touches ambient process state: everything it needs
//! from the outside world (which packages a project uses, what is loaded
//! in the current session, dependency edges, citation metadata, document
//! rendering) arrives through these traits. Tests substitute fakes and get
//! fully deterministic runs.

use std::path::{Path, PathBuf};

use gratia_bibtex::Entry;

use crate::error::ProviderError;
use crate::render::RenderFormat;

/// Detects which packages a project's source files use, in the order first
/// encountered
pub trait UsageScanner {
    fn scan(&self, project_root: &Path) -> Result<Vec<String>, ProviderError>;
}

/// Reports the packages loaded in the current interactive session
pub trait SessionSource {
    fn loaded_packages(&self) -> Result<Vec<String>, ProviderError>;
}

/// Options forwarded to the dependency-graph provider
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Which dependency fields to follow
    pub fields: Vec<String>,
    /// Whether the provider should return the transitive closure itself
    pub recursive: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            fields: ["Depends", "Imports", "LinkingTo"]
                .into_iter()
                .map(String::from)
                .collect(),
            recursive: true,
        }
    }
}

/// Yields the dependency names of one package
pub trait DependencyGraph {
    fn dependencies_of(
        &self,
        package: &str,
        options: &GraphOptions,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Supplies raw citation entries and installed versions
pub trait MetadataProvider {
    /// Zero, one, or many bibliographic entries for the package. Zero is
    /// fine: the resolver synthesizes a fallback.
    fn citations_for(&self, package: &str) -> Result<Vec<Entry>, ProviderError>;

    /// The installed version, or `None` when unresolvable
    fn installed_version(&self, package: &str) -> Result<Option<String>, ProviderError>;
}

/// Renders an assembled template document to the requested format
pub trait DocumentRenderer {
    fn render(
        &self,
        template: &Path,
        format: RenderFormat,
        style: Option<&Path>,
    ) -> Result<PathBuf, ProviderError>;
}

/// The bundle of collaborators handed to the entry point
///
/// Only the metadata provider is always required; the others are checked
/// against the request before any work begins.
pub struct Providers<'a> {
    pub metadata: &'a dyn MetadataProvider,
    pub scanner: Option<&'a dyn UsageScanner>,
    pub session: Option<&'a dyn SessionSource>,
    pub graph: Option<&'a dyn DependencyGraph>,
    pub renderer: Option<&'a dyn DocumentRenderer>,
}

impl<'a> Providers<'a> {
    pub fn new(metadata: &'a dyn MetadataProvider) -> Self {
        Self {
            metadata,
            scanner: None,
            session: None,
            graph: None,
            renderer: None,
        }
    }

    pub fn with_scanner(mut self, scanner: &'a dyn UsageScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_session(mut self, session: &'a dyn SessionSource) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_graph(mut self, graph: &'a dyn DependencyGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn with_renderer(mut self, renderer: &'a dyn DocumentRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }
}
