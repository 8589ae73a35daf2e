//! The programmatic surface: one request in, one result out
//!
//! `cite_packages` runs the whole pipeline: expansion, resolution,
//! deduplication, bibliography serialization (every mode writes the
//! bibliography), then the presentation projection the caller asked for.
//! Invalid configuration fails before any provider is touched.

use std::path::PathBuf;

use crate::bibliography::{write_atomic, write_bibliography};
use crate::dedup::finalize;
use crate::domain::PackageTable;
use crate::error::CitationError;
use crate::expand::{expand, ExpandOptions, GroupDefinition, PackageSelection};
use crate::providers::{GraphOptions, Providers};
use crate::render::document::{assemble, DocumentSpec};
use crate::render::{self, PackageRow, RenderFormat};
use crate::resolve::{ResolutionReport, Resolver};

/// What shape of output the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Write bibliography + template and render the report document
    File,
    /// Inline-markup paragraph string
    Paragraph,
    /// Flat row set
    Table,
    /// Bare citekey sequence
    Citekeys,
}

impl std::str::FromStr for OutputMode {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "paragraph" => Ok(Self::Paragraph),
            "table" => Ok(Self::Table),
            "citekeys" => Ok(Self::Citekeys),
            other => Err(CitationError::Configuration(format!(
                "unknown output mode `{}`; expected file, paragraph, table, or citekeys",
                other
            ))),
        }
    }
}

/// Everything the caller can ask for
#[derive(Debug, Clone)]
pub struct CitationRequest {
    pub output: OutputMode,
    /// Report format, used when `output` is `File`
    pub format: RenderFormat,
    /// Optional CSL style-sheet reference forwarded to the renderer
    pub style: Option<String>,
    pub selection: PackageSelection,
    pub cite_tidyverse: bool,
    pub include_dependencies: bool,
    pub include_ide: bool,
    pub include_base: bool,
    /// Additional group definitions beyond the built-in tidyverse group
    pub groups: Vec<GroupDefinition>,
    /// Pass-through options for the dependency-graph provider
    pub graph: GraphOptions,
    pub project_root: PathBuf,
    pub out_dir: PathBuf,
    pub bib_name: String,
    /// Template filename; defaults to `<output_base>.qmd`
    pub template_name: Option<String>,
    pub output_base: String,
    pub title: String,
}

impl CitationRequest {
    pub fn new(output: OutputMode) -> Self {
        Self {
            output,
            format: RenderFormat::Html,
            style: None,
            selection: PackageSelection::All,
            cite_tidyverse: false,
            include_dependencies: false,
            include_ide: false,
            include_base: true,
            groups: Vec::new(),
            graph: GraphOptions::default(),
            project_root: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            bib_name: "gratia-refs.bib".to_string(),
            template_name: None,
            output_base: "gratia-report".to_string(),
            title: "Package citations".to_string(),
        }
    }

    pub fn with_packages(mut self, names: Vec<String>) -> Self {
        self.selection = PackageSelection::Explicit(names);
        self
    }

    pub fn with_selection(mut self, selection: PackageSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_format(mut self, format: RenderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn cite_tidyverse(mut self, fold: bool) -> Self {
        self.cite_tidyverse = fold;
        self
    }

    pub fn include_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }

    pub fn include_ide(mut self, include: bool) -> Self {
        self.include_ide = include;
        self
    }

    pub fn exclude_base_runtime(mut self) -> Self {
        self.include_base = false;
        self
    }

    pub fn with_group(mut self, group: GroupDefinition) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_graph_options(mut self, graph: GraphOptions) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_bib_name(mut self, name: impl Into<String>) -> Self {
        self.bib_name = name.into();
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn with_output_base(mut self, base: impl Into<String>) -> Self {
        self.output_base = base.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn effective_template_name(&self) -> String {
        self.template_name
            .clone()
            .unwrap_or_else(|| format!("{}.qmd", self.output_base))
    }
}

/// Mode-specific payload of a finished run
#[derive(Debug, Clone)]
pub enum Output {
    Files {
        bibliography: PathBuf,
        /// The rendered report, or the template itself for `Source`
        document: PathBuf,
    },
    Paragraph(String),
    Table(Vec<PackageRow>),
    Citekeys(Vec<String>),
}

/// Result of a pipeline run: the table, the resolution report, and the
/// requested projection
#[derive(Debug, Clone)]
pub struct Citations {
    pub table: PackageTable,
    pub report: ResolutionReport,
    pub output: Output,
}

impl Citations {
    /// Paragraph projection, available regardless of the requested mode
    pub fn paragraph(&self) -> String {
        render::paragraph(&self.table)
    }

    pub fn rows(&self) -> Vec<PackageRow> {
        render::table_rows(&self.table)
    }

    pub fn citekeys(&self) -> Vec<String> {
        render::citekeys(&self.table)
    }
}

/// Run the pipeline
pub fn cite_packages(
    request: &CitationRequest,
    providers: &Providers<'_>,
) -> Result<Citations, CitationError> {
    // Argument validation up front, before any provider work
    if request.output == OutputMode::File
        && request.format != RenderFormat::Source
        && providers.renderer.is_none()
    {
        return Err(CitationError::Configuration(
            "file output requires a document renderer".to_string(),
        ));
    }

    let mut groups = request.groups.clone();
    if request.cite_tidyverse {
        groups.insert(0, GroupDefinition::tidyverse());
    }
    let options = ExpandOptions {
        include_dependencies: request.include_dependencies,
        include_base: request.include_base,
        include_ide: request.include_ide,
        groups,
        graph: request.graph.clone(),
    };

    let requests = expand(&request.selection, &options, providers, &request.project_root)?;
    let (citations, report) = Resolver::new(providers.metadata).resolve_all(&requests);
    let table = finalize(citations);

    std::fs::create_dir_all(&request.out_dir).map_err(|source| CitationError::Serialization {
        path: request.out_dir.clone(),
        source,
    })?;
    let bib_path = request.out_dir.join(&request.bib_name);
    write_bibliography(&table, &bib_path)?;
    tracing::debug!(path = %bib_path.display(), entries = table.citekeys.len(), "bibliography written");

    let output = match request.output {
        OutputMode::Citekeys => Output::Citekeys(render::citekeys(&table)),
        OutputMode::Paragraph => Output::Paragraph(render::paragraph(&table)),
        OutputMode::Table => Output::Table(render::table_rows(&table)),
        OutputMode::File => {
            let template_path = request.out_dir.join(request.effective_template_name());
            let doc = assemble(
                &table,
                &DocumentSpec {
                    title: request.title.clone(),
                    bibliography: request.bib_name.clone(),
                    csl: request.style.clone(),
                },
            );
            write_atomic(&template_path, &doc)?;

            let document = if request.format == RenderFormat::Source {
                template_path
            } else {
                // Presence checked above
                let renderer = providers.renderer.ok_or_else(|| {
                    CitationError::Configuration(
                        "file output requires a document renderer".to_string(),
                    )
                })?;
                renderer
                    .render(
                        &template_path,
                        request.format,
                        request.style.as_deref().map(std::path::Path::new),
                    )
                    .map_err(|e| CitationError::Render {
                        format: request.format.to_string(),
                        message: e.to_string(),
                    })?
            };

            Output::Files {
                bibliography: bib_path,
                document,
            }
        }
    };

    Ok(Citations {
        table,
        report,
        output,
    })
}
