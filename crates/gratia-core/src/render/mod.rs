//! Presentation of the final table
//!
//! Pure text projections: a prose paragraph with inline citation markers,
//! a flat row set, and the bare citekey sequence. Document assembly for
//! the external renderer lives in `document`.

pub mod document;

use serde::{Deserialize, Serialize};

use crate::domain::{CitationRole, PackageCitation, PackageTable};
use crate::error::CitationError;

/// Output format for the rendered report document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderFormat {
    Html,
    Docx,
    Pdf,
    Markdown,
    /// The editable template itself, no external renderer involved
    Source,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::Source => "source",
        }
    }
}

impl std::fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderFormat {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "docx" | "word" => Ok(Self::Docx),
            "pdf" => Ok(Self::Pdf),
            "markdown" | "md" => Ok(Self::Markdown),
            "source" | "qmd" => Ok(Self::Source),
            other => Err(CitationError::Configuration(format!(
                "unknown render format `{}`; expected html, docx, pdf, markdown, or source",
                other
            ))),
        }
    }
}

/// One row of the tabular projection, one per package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRow {
    pub package: String,
    pub version: String,
    /// Citekeys joined with `; `
    pub citekeys: String,
    /// Formatted citation text of all records, joined
    pub citation: String,
}

/// Version string for display, with the unknown sentinel
fn shown_version(citation: &PackageCitation) -> &str {
    citation.version.as_deref().unwrap_or("unknown")
}

/// Inline marker block for one package: `[@key1; @key2]`
fn marker_block(citation: &PackageCitation) -> String {
    let markers: Vec<String> = citation.citekeys().iter().map(|k| k.marker()).collect();
    format!("[{}]", markers.join("; "))
}

/// One paragraph mentioning every package in table order, prefixed by the
/// base-runtime sentence when present
pub fn paragraph(table: &PackageTable) -> String {
    let base = table
        .packages
        .iter()
        .find(|p| p.role == CitationRole::BaseRuntime);

    let fragments: Vec<String> = table
        .packages
        .iter()
        .filter(|p| p.role != CitationRole::BaseRuntime)
        .map(|p| {
            format!(
                "{} (v. {}) {}",
                p.package,
                shown_version(p),
                marker_block(p)
            )
        })
        .collect();

    match (base, fragments.is_empty()) {
        (Some(base), false) => format!(
            "We used {} (v. {}) {} together with the following packages: {}.",
            base.package,
            shown_version(base),
            marker_block(base),
            fragments.join(", ")
        ),
        (Some(base), true) => format!(
            "We used {} (v. {}) {}.",
            base.package,
            shown_version(base),
            marker_block(base)
        ),
        (None, _) => format!("We used the following packages: {}.", fragments.join(", ")),
    }
}

/// Flat row set, one row per package (not per record)
pub fn table_rows(table: &PackageTable) -> Vec<PackageRow> {
    table
        .packages
        .iter()
        .map(|p| PackageRow {
            package: p.package.clone(),
            version: shown_version(p).to_string(),
            citekeys: p
                .citekeys()
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            citation: p
                .records
                .iter()
                .map(|r| r.formatted.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect()
}

/// The flat unique citekey sequence
pub fn citekeys(table: &PackageTable) -> Vec<String> {
    table.citekeys.iter().map(|k| k.as_str().to_string()).collect()
}
