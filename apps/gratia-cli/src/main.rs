//! gratia - cite the R packages your project uses
//!
//! Scans a project (or takes an explicit list), resolves citation metadata
//! through a local R installation, writes a deduplicated BibTeX
//! bibliography, and prints or renders the requested output.

mod quarto;
mod rscript;
mod scanner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gratia_core::{
    cite_packages, CitationError, CitationRequest, GraphOptions, Output, OutputMode,
    PackageSelection, Providers, RenderFormat,
};

use quarto::QuartoRenderer;
use rscript::RscriptBridge;
use scanner::SourceScanner;

#[derive(Parser, Debug)]
#[command(
    name = "gratia",
    version,
    about = "Cite the R packages a project uses",
    long_about = "Discovers the packages a project uses, resolves their citation metadata \
                  via Rscript, writes a deduplicated BibTeX bibliography, and emits a \
                  citation paragraph, a table, the citekeys, or a rendered report."
)]
struct Cli {
    /// Output mode: file, paragraph, table, or citekeys
    #[arg(long, default_value = "file")]
    output: String,

    /// Report format for file output: html, docx, pdf, markdown, or source
    #[arg(long, default_value = "html")]
    format: String,

    /// CSL style-sheet reference forwarded to the renderer
    #[arg(long)]
    csl: Option<String>,

    /// Cite these packages instead of scanning the project (repeatable)
    #[arg(long = "pkg", value_name = "NAME")]
    packages: Vec<String>,

    /// Cite the packages loaded in the current R session
    #[arg(long, conflicts_with = "packages")]
    session: bool,

    /// Fold tidyverse packages into one umbrella citation
    #[arg(long)]
    cite_tidyverse: bool,

    /// Also cite transitive dependencies
    #[arg(long)]
    include_dependencies: bool,

    /// Add a citation for the IDE
    #[arg(long)]
    include_ide: bool,

    /// Skip the base R citation
    #[arg(long)]
    no_base: bool,

    /// Project root to scan
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// Directory for the bibliography and report files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Bibliography filename
    #[arg(long, default_value = "gratia-refs.bib")]
    bib_name: String,

    /// Template filename (defaults to <output-base>.qmd)
    #[arg(long)]
    template_name: Option<String>,

    /// Base name for the report files
    #[arg(long, default_value = "gratia-report")]
    output_base: String,

    /// Report title
    #[arg(long, default_value = "Package citations")]
    title: String,

    /// Dependency fields to follow (repeatable; default Depends, Imports,
    /// LinkingTo)
    #[arg(long = "dep-field", value_name = "FIELD")]
    dep_fields: Vec<String>,

    /// Ask the dependency-graph provider for direct dependencies only
    #[arg(long)]
    no_recursive: bool,

    /// Print table output as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CitationError> {
    let request = build_request(&cli)?;

    let rscript = RscriptBridge::new();
    let scanner = SourceScanner::new();
    let renderer = QuartoRenderer::new();
    let providers = Providers::new(&rscript)
        .with_scanner(&scanner)
        .with_session(&rscript)
        .with_graph(&rscript)
        .with_renderer(&renderer);

    let citations = cite_packages(&request, &providers)?;

    if !citations.report.is_clean() {
        eprintln!(
            "warning: no citation metadata for {}; minimal entries were generated",
            citations.report.fell_back.join(", ")
        );
    }

    match &citations.output {
        Output::Files {
            bibliography,
            document,
        } => {
            println!("bibliography: {}", bibliography.display());
            println!("report: {}", document.display());
        }
        Output::Paragraph(text) => println!("{}", text),
        Output::Table(rows) => {
            if cli.json {
                match serde_json::to_string_pretty(rows) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        return Err(CitationError::Configuration(format!(
                            "table serialization failed: {}",
                            e
                        )))
                    }
                }
            } else {
                for row in rows {
                    println!("{}\t{}\t{}\t{}", row.package, row.version, row.citekeys, row.citation);
                }
            }
        }
        Output::Citekeys(keys) => {
            for key in keys {
                println!("{}", key);
            }
        }
    }

    Ok(())
}

/// Translate CLI flags into a pipeline request; invalid mode or format
/// strings fail here, before any provider is touched
fn build_request(cli: &Cli) -> Result<CitationRequest, CitationError> {
    let output: OutputMode = cli.output.parse()?;
    let format: RenderFormat = cli.format.parse()?;

    let selection = if !cli.packages.is_empty() {
        PackageSelection::Explicit(cli.packages.clone())
    } else if cli.session {
        PackageSelection::Session
    } else {
        PackageSelection::All
    };

    let mut graph = GraphOptions::default();
    if !cli.dep_fields.is_empty() {
        graph.fields = cli.dep_fields.clone();
    }
    graph.recursive = !cli.no_recursive;

    let mut request = CitationRequest::new(output)
        .with_selection(selection)
        .with_format(format)
        .cite_tidyverse(cli.cite_tidyverse)
        .include_dependencies(cli.include_dependencies)
        .include_ide(cli.include_ide)
        .with_graph_options(graph)
        .with_project_root(&cli.project)
        .with_out_dir(&cli.out_dir)
        .with_bib_name(&cli.bib_name)
        .with_output_base(&cli.output_base)
        .with_title(&cli.title);

    if cli.no_base {
        request = request.exclude_base_runtime();
    }
    if let Some(csl) = &cli.csl {
        request = request.with_style(csl);
    }
    if let Some(name) = &cli.template_name {
        request = request.with_template_name(name);
    }

    Ok(request)
}
