//! Requested packages and their roles in the final table

use serde::{Deserialize, Serialize};

/// How a table row came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitationRole {
    /// The language runtime itself, inserted first unless excluded
    BaseRuntime,
    /// An ordinary package (requested, scanned, or pulled in as a dependency)
    Package,
    /// A synthetic umbrella substituted for a configured group of packages
    Group,
    /// The development environment, appended when requested
    Ide,
}

/// One package to cite
///
/// Identity is the name, case-sensitive. Requests are immutable once
/// constructed; expansion produces new requests rather than editing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequest {
    pub name: String,
    pub min_version: Option<String>,
    pub role: CitationRole,
}

impl PackageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_version: None,
            role: CitationRole::Package,
        }
    }

    pub fn with_min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }

    pub fn with_role(mut self, role: CitationRole) -> Self {
        self.role = role;
        self
    }

    /// Parse caller input of the form `name` or `name (>= version)`
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Some(open) = trimmed.find("(>=") {
            let name = trimmed[..open].trim();
            let rest = trimmed[open + 3..].trim_end_matches(')').trim();
            if !name.is_empty() && !rest.is_empty() {
                return Self::new(name).with_min_version(rest);
            }
        }
        Self::new(trimmed)
    }
}
