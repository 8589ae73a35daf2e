//! Thin bridge to an installed R via `Rscript`
//!
//! One provider struct serves three pipeline traits: citation metadata
//! (`toBibtex(citation(pkg))`, parsed by gratia-bibtex), installed
//! versions (`packageVersion`), dependency edges
//! (`tools::package_dependencies`), and loaded session packages
//! (`loadedNamespaces`). Each call spawns a fresh `Rscript --vanilla`
//! process; failures surface as provider errors and the pipeline degrades
//! per package.

use std::process::Command;

use gratia_bibtex::{parse_entries, Entry};
use gratia_core::{
    DependencyGraph, GraphOptions, MetadataProvider, ProviderError, SessionSource,
};

/// Base packages that ship with R; filtered out of session listings
const BASE_PACKAGES: &[&str] = &[
    "base", "compiler", "datasets", "grDevices", "graphics", "grid", "methods", "parallel",
    "splines", "stats", "stats4", "tcltk", "tools", "utils",
];

/// Provider backed by `Rscript --vanilla`
#[derive(Debug, Clone)]
pub struct RscriptBridge {
    program: String,
}

impl Default for RscriptBridge {
    fn default() -> Self {
        Self {
            program: "Rscript".to_string(),
        }
    }
}

impl RscriptBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific Rscript binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn eval(&self, expr: &str) -> Result<String, ProviderError> {
        let output = Command::new(&self.program)
            .args(["--vanilla", "-e", expr])
            .output()
            .map_err(|e| {
                ProviderError::Unavailable(format!("failed to launch {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(ProviderError::Unavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reject names that could escape the quoted R expression
fn checked_name(package: &str) -> Result<&str, ProviderError> {
    let valid = !package.is_empty()
        && package
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.');
    if valid {
        Ok(package)
    } else {
        Err(ProviderError::Parse(format!(
            "not a valid R package name: {:?}",
            package
        )))
    }
}

/// R expression printing a package's citations as BibTeX
fn citation_expr(package: &str) -> String {
    format!(
        "cat(unlist(lapply(citation(\"{}\"), function(e) c(toBibtex(e), \"\"))), sep = \"\\n\")",
        package
    )
}

/// R expression printing the installed version, or nothing
fn version_expr(package: &str) -> String {
    format!("cat(as.character(packageVersion(\"{}\")))", package)
}

/// R expression printing dependency names one per line
fn dependencies_expr(package: &str, options: &GraphOptions) -> String {
    let which = options
        .fields
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect::<Vec<_>>()
        .join(", ");
    let recursive = if options.recursive { "TRUE" } else { "FALSE" };
    format!(
        "cat(unlist(tools::package_dependencies(\"{}\", which = c({}), recursive = {})), sep = \"\\n\")",
        package, which, recursive
    )
}

impl MetadataProvider for RscriptBridge {
    fn citations_for(&self, package: &str) -> Result<Vec<Entry>, ProviderError> {
        let name = checked_name(package)?;
        let text = self.eval(&citation_expr(name))?;
        let outcome = parse_entries(&text);
        for issue in &outcome.issues {
            tracing::warn!(package, line = issue.line, "{}", issue.message);
        }
        Ok(outcome.entries)
    }

    fn installed_version(&self, package: &str) -> Result<Option<String>, ProviderError> {
        let name = checked_name(package)?;
        // packageVersion errors for packages that are not installed; that
        // is the unresolvable case, not a provider failure
        match self.eval(&version_expr(name)) {
            Ok(out) => {
                let version = out.trim();
                Ok((!version.is_empty()).then(|| version.to_string()))
            }
            Err(_) => Ok(None),
        }
    }
}

impl DependencyGraph for RscriptBridge {
    fn dependencies_of(
        &self,
        package: &str,
        options: &GraphOptions,
    ) -> Result<Vec<String>, ProviderError> {
        let name = checked_name(package)?;
        let out = self.eval(&dependencies_expr(name, options))?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && *line != "R")
            .map(str::to_string)
            .collect())
    }
}

impl SessionSource for RscriptBridge {
    fn loaded_packages(&self) -> Result<Vec<String>, ProviderError> {
        let out = self.eval("cat(loadedNamespaces(), sep = \"\\n\")")?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !BASE_PACKAGES.contains(line))
            .map(str::to_string)
            .collect())
    }
}
