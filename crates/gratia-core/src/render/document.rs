//! Template document assembly for the external renderer
//!
//! Produces a Quarto-style source document: YAML front matter referencing
//! the bibliography (and optionally a CSL style sheet), then the citation
//! paragraph. The external renderer resolves the `@key` markers against
//! the bibliography file when it formats the reference list.

use crate::domain::PackageTable;

/// Document metadata for the front matter
#[derive(Debug, Clone)]
pub struct DocumentSpec {
    pub title: String,
    /// Bibliography file reference, relative to the document
    pub bibliography: String,
    /// Optional CSL style-sheet reference
    pub csl: Option<String>,
}

/// Assemble the full template source
pub fn assemble(table: &PackageTable, spec: &DocumentSpec) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_title(&spec.title)));
    out.push_str(&format!("bibliography: {}\n", spec.bibliography));
    if let Some(csl) = &spec.csl {
        out.push_str(&format!("csl: {}\n", csl));
    }
    out.push_str("---\n\n");
    out.push_str(&super::paragraph(table));
    out.push_str("\n\n## References\n");
    out
}

fn escape_title(title: &str) -> String {
    title.replace('"', "\\\"")
}
