//! Project source scanning for package usage
//!
//! Walks `.R`, `.Rmd`, `.qmd`, and `.Rnw` files under the project root and
//! collects package names from `library()`, `require()`,
//! `requireNamespace()`, and `pkg::` usage, in the order first encountered.
//! Hidden directories and the renv library tree are skipped.

use std::collections::HashSet;
use std::path::Path;

use gratia_core::{ProviderError, UsageScanner};
use lazy_static::lazy_static;
use regex::Regex;
use walkdir::WalkDir;

lazy_static! {
    static ref ATTACH_RE: Regex =
        Regex::new(r#"(?:library|require)\s*\(\s*["']?([a-zA-Z][a-zA-Z0-9.]*)["']?\s*[,)]"#)
            .expect("attach pattern");
    static ref NAMESPACE_RE: Regex =
        Regex::new(r#"requireNamespace\s*\(\s*["']([a-zA-Z][a-zA-Z0-9.]*)["']"#)
            .expect("requireNamespace pattern");
    static ref COLON_RE: Regex =
        Regex::new(r#"\b([a-zA-Z][a-zA-Z0-9.]*)::"#).expect("double-colon pattern");
}

const SOURCE_EXTENSIONS: &[&str] = &["R", "r", "Rmd", "rmd", "qmd", "Rnw"];

/// Regex-based scanner over a project's source tree
#[derive(Debug, Default)]
pub struct SourceScanner;

impl SourceScanner {
    pub fn new() -> Self {
        Self
    }
}

impl UsageScanner for SourceScanner {
    fn scan(&self, project_root: &Path) -> Result<Vec<String>, ProviderError> {
        if !project_root.exists() {
            return Err(ProviderError::Unavailable(format!(
                "project root {} does not exist",
                project_root.display()
            )));
        }

        let mut found = Vec::new();
        let mut seen = HashSet::new();

        let walker = WalkDir::new(project_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !name.starts_with('.') && name != "renv" && name != "packrat"
            });

        for entry in walker {
            let entry = entry.map_err(|e| ProviderError::Unavailable(e.to_string()))?;
            if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
                continue;
            }
            let text = std::fs::read_to_string(entry.path())?;
            collect_packages(&text, &mut found, &mut seen);
        }

        Ok(found)
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Extract package names from one file's text, appending unseen names in
/// the order they appear
fn collect_packages(text: &str, found: &mut Vec<String>, seen: &mut HashSet<String>) {
    // Collect (position, name) so mixed match kinds keep source order
    let mut hits: Vec<(usize, &str)> = Vec::new();
    for caps in ATTACH_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            hits.push((m.start(), m.as_str()));
        }
    }
    for caps in NAMESPACE_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            hits.push((m.start(), m.as_str()));
        }
    }
    for caps in COLON_RE.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            hits.push((m.start(), m.as_str()));
        }
    }
    hits.sort_by_key(|(pos, _)| *pos);

    for (_, name) in hits {
        if seen.insert(name.to_string()) {
            found.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_text(text: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        collect_packages(text, &mut found, &mut seen);
        found
    }

    #[test]
    fn finds_library_and_require_calls() {
        let code = r#"
library(dplyr)
require("ggplot2")
library(lme4, quietly = TRUE)
"#;
        assert_eq!(scan_text(code), vec!["dplyr", "ggplot2", "lme4"]);
    }

    #[test]
    fn finds_namespaced_usage() {
        let code = "result <- mgcv::gam(y ~ s(x))";
        assert_eq!(scan_text(code), vec!["mgcv"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let code = "library(dplyr)\ndplyr::mutate(df)\nlibrary(dplyr)";
        assert_eq!(scan_text(code), vec!["dplyr"]);
    }

    #[test]
    fn order_follows_source_position() {
        let code = "x <- tidyr::pivot_longer(df)\nlibrary(dplyr)";
        assert_eq!(scan_text(code), vec!["tidyr", "dplyr"]);
    }

    #[test]
    fn scans_project_tree_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.R"), "library(mgcv)").unwrap();
        std::fs::write(dir.path().join("b.Rmd"), "library(lme4)").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "library(ignored)").unwrap();

        let scanner = SourceScanner::new();
        let found = scanner.scan(dir.path()).unwrap();
        assert_eq!(found, vec!["mgcv", "lme4"]);
    }

    #[test]
    fn hidden_and_renv_dirs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("renv")).unwrap();
        std::fs::write(dir.path().join("renv/activate.R"), "library(renv)").unwrap();
        std::fs::write(dir.path().join("analysis.R"), "library(mgcv)").unwrap();

        let scanner = SourceScanner::new();
        let found = scanner.scan(dir.path()).unwrap();
        assert_eq!(found, vec!["mgcv"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let scanner = SourceScanner::new();
        assert!(scanner.scan(Path::new("/no/such/project")).is_err());
    }
}
