//! Dependency expansion and group folding
//!
//! Turns the caller's selection into the ordered package set the resolver
//! works through: selection source, optional transitive dependency closure,
//! group folding, the base runtime first, and optionally the IDE last.
//! Ordering is explicit throughout (sequence plus membership set); nothing
//! relies on map iteration order.

use std::collections::HashSet;
use std::path::Path;

use crate::domain::{CitationRole, PackageRequest};
use crate::error::CitationError;
use crate::providers::{GraphOptions, Providers};

/// Name of the synthetic base-runtime entry
pub const BASE_RUNTIME: &str = "R";

/// Name of the synthetic IDE entry
pub const IDE_NAME: &str = "RStudio";

/// Where the initial package set comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSelection {
    /// Scan the project tree for used packages
    All,
    /// Ask the session source for currently loaded packages
    Session,
    /// Caller-supplied list, order preserved, first occurrence wins
    Explicit(Vec<String>),
}

/// A set of packages cited as one umbrella entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDefinition {
    pub name: String,
    pub members: Vec<String>,
}

impl GroupDefinition {
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in tidyverse group: its core packages fold into one
    /// umbrella citation
    pub fn tidyverse() -> Self {
        Self::new(
            "tidyverse",
            [
                "ggplot2", "dplyr", "tidyr", "readr", "purrr", "tibble", "stringr", "forcats",
                "lubridate",
            ],
        )
    }
}

/// Expansion switches, resolved from the caller's request
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    pub include_dependencies: bool,
    /// Insert the base runtime first (on unless explicitly excluded)
    pub include_base: bool,
    pub include_ide: bool,
    pub groups: Vec<GroupDefinition>,
    /// Pass-through options for the dependency-graph provider
    pub graph: GraphOptions,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            include_dependencies: false,
            include_base: true,
            include_ide: false,
            groups: Vec::new(),
            graph: GraphOptions::default(),
        }
    }
}

/// A sequence with set membership, for first-seen-wins ordering
#[derive(Debug, Default)]
struct OrderedSet {
    seq: Vec<PackageRequest>,
    seen: HashSet<String>,
}

impl OrderedSet {
    fn insert(&mut self, request: PackageRequest) -> bool {
        if self.seen.contains(&request.name) {
            return false;
        }
        self.seen.insert(request.name.clone());
        self.seq.push(request);
        true
    }

    fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    fn into_vec(self) -> Vec<PackageRequest> {
        self.seq
    }
}

/// Expand the selection into the final ordered request list
pub fn expand(
    selection: &PackageSelection,
    options: &ExpandOptions,
    providers: &Providers<'_>,
    project_root: &Path,
) -> Result<Vec<PackageRequest>, CitationError> {
    let mut set = OrderedSet::default();

    match selection {
        PackageSelection::Explicit(names) => {
            for name in names {
                set.insert(PackageRequest::parse(name));
            }
        }
        PackageSelection::All => {
            let scanner = providers.scanner.ok_or_else(|| {
                CitationError::Configuration(
                    "selection mode `all` requires a usage scanner".to_string(),
                )
            })?;
            let names = scanner.scan(project_root).map_err(|e| CitationError::Discovery {
                origin: format!("project scan of {}", project_root.display()),
                message: e.to_string(),
            })?;
            for name in names {
                set.insert(PackageRequest::new(name));
            }
        }
        PackageSelection::Session => {
            let session = providers.session.ok_or_else(|| {
                CitationError::Configuration(
                    "selection mode `session` requires a session source".to_string(),
                )
            })?;
            let names = session.loaded_packages().map_err(|e| CitationError::Discovery {
                origin: "session packages".to_string(),
                message: e.to_string(),
            })?;
            for name in names {
                set.insert(PackageRequest::new(name));
            }
        }
    }

    if options.include_dependencies {
        let graph = providers.graph.ok_or_else(|| {
            CitationError::Configuration(
                "dependency expansion requires a dependency-graph provider".to_string(),
            )
        })?;

        // Breadth-first over the initial set; discovery order, first seen wins
        let mut queue: Vec<String> = set.seq.iter().map(|r| r.name.clone()).collect();
        let mut cursor = 0;
        while cursor < queue.len() {
            let package = queue[cursor].clone();
            cursor += 1;
            match graph.dependencies_of(&package, &options.graph) {
                Ok(deps) => {
                    for dep in deps {
                        if !set.contains(&dep) {
                            queue.push(dep.clone());
                            set.insert(PackageRequest::new(dep));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(package = %package, error = %e, "dependency lookup failed, skipping");
                }
            }
        }
    }

    let mut requests = set.into_vec();
    for group in &options.groups {
        requests = fold_group(requests, group);
    }

    if options.include_base && !requests.iter().any(|r| r.role == CitationRole::BaseRuntime) {
        requests.insert(
            0,
            PackageRequest::new(BASE_RUNTIME).with_role(CitationRole::BaseRuntime),
        );
    }

    if options.include_ide && !requests.iter().any(|r| r.role == CitationRole::Ide) {
        requests.push(PackageRequest::new(IDE_NAME).with_role(CitationRole::Ide));
    }

    Ok(requests)
}

/// Replace all present members of the group with one umbrella request at
/// the position of the first member encountered
fn fold_group(requests: Vec<PackageRequest>, group: &GroupDefinition) -> Vec<PackageRequest> {
    let members: HashSet<&str> = group.members.iter().map(String::as_str).collect();
    if !requests.iter().any(|r| members.contains(r.name.as_str())) {
        return requests;
    }

    let mut folded = Vec::with_capacity(requests.len());
    let mut substituted = false;
    for request in requests {
        if members.contains(request.name.as_str()) || request.name == group.name {
            if !substituted {
                folded.push(
                    PackageRequest::new(group.name.clone()).with_role(CitationRole::Group),
                );
                substituted = true;
            }
            continue;
        }
        folded.push(request);
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::{DependencyGraph, GraphOptions, MetadataProvider, UsageScanner};
    use gratia_bibtex::Entry;
    use std::collections::HashMap;

    struct NoMetadata;

    impl MetadataProvider for NoMetadata {
        fn citations_for(&self, _package: &str) -> Result<Vec<Entry>, ProviderError> {
            Ok(Vec::new())
        }
        fn installed_version(&self, _package: &str) -> Result<Option<String>, ProviderError> {
            Ok(None)
        }
    }

    struct FixedScanner(Vec<&'static str>);

    impl UsageScanner for FixedScanner {
        fn scan(&self, _root: &Path) -> Result<Vec<String>, ProviderError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FixedGraph(HashMap<&'static str, Vec<&'static str>>);

    impl DependencyGraph for FixedGraph {
        fn dependencies_of(
            &self,
            package: &str,
            _options: &GraphOptions,
        ) -> Result<Vec<String>, ProviderError> {
            Ok(self
                .0
                .get(package)
                .map(|deps| deps.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default())
        }
    }

    fn names(requests: &[PackageRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn explicit_selection_dedups_first_wins() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let selection = PackageSelection::Explicit(vec![
            "lme4".to_string(),
            "mgcv".to_string(),
            "lme4".to_string(),
        ]);

        let requests =
            expand(&selection, &ExpandOptions::default(), &providers, Path::new(".")).unwrap();
        assert_eq!(names(&requests), vec!["R", "lme4", "mgcv"]);
        assert_eq!(requests[0].role, CitationRole::BaseRuntime);
    }

    #[test]
    fn all_mode_without_scanner_is_a_configuration_error() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let err = expand(
            &PackageSelection::All,
            &ExpandOptions::default(),
            &providers,
            Path::new("."),
        )
        .unwrap_err();
        assert!(matches!(err, CitationError::Configuration(_)));
    }

    #[test]
    fn scanner_order_is_preserved() {
        let metadata = NoMetadata;
        let scanner = FixedScanner(vec!["dplyr", "lme4"]);
        let providers = Providers::new(&metadata).with_scanner(&scanner);

        let requests = expand(
            &PackageSelection::All,
            &ExpandOptions::default(),
            &providers,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(names(&requests), vec!["R", "dplyr", "lme4"]);
    }

    #[test]
    fn dependency_closure_appends_in_discovery_order() {
        let metadata = NoMetadata;
        let graph = FixedGraph(HashMap::from([
            ("lme4", vec!["Matrix", "minqa"]),
            ("Matrix", vec!["lattice"]),
        ]));
        let providers = Providers::new(&metadata).with_graph(&graph);
        let options = ExpandOptions {
            include_dependencies: true,
            ..Default::default()
        };

        let requests = expand(
            &PackageSelection::Explicit(vec!["lme4".to_string()]),
            &options,
            &providers,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(names(&requests), vec!["R", "lme4", "Matrix", "minqa", "lattice"]);
    }

    #[test]
    fn expansion_is_monotonic() {
        let metadata = NoMetadata;
        let graph = FixedGraph(HashMap::from([("lme4", vec!["Matrix"])]));
        let providers = Providers::new(&metadata).with_graph(&graph);
        let selection = PackageSelection::Explicit(vec!["lme4".to_string()]);

        let without = expand(&selection, &ExpandOptions::default(), &providers, Path::new("."))
            .unwrap();
        let with = expand(
            &selection,
            &ExpandOptions {
                include_dependencies: true,
                ..Default::default()
            },
            &providers,
            Path::new("."),
        )
        .unwrap();

        let with_names: Vec<_> = names(&with);
        for name in names(&without) {
            assert!(with_names.contains(&name));
        }
    }

    #[test]
    fn group_folds_at_first_member_position() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let options = ExpandOptions {
            groups: vec![GroupDefinition::tidyverse()],
            ..Default::default()
        };

        let requests = expand(
            &PackageSelection::Explicit(vec![
                "lme4".to_string(),
                "dplyr".to_string(),
                "mgcv".to_string(),
                "ggplot2".to_string(),
                "tidyr".to_string(),
            ]),
            &options,
            &providers,
            Path::new("."),
        )
        .unwrap();

        assert_eq!(names(&requests), vec!["R", "lme4", "tidyverse", "mgcv"]);
        assert_eq!(requests[2].role, CitationRole::Group);
    }

    #[test]
    fn group_absent_members_pass_through() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let options = ExpandOptions {
            groups: vec![GroupDefinition::tidyverse()],
            ..Default::default()
        };

        let requests = expand(
            &PackageSelection::Explicit(vec!["lme4".to_string()]),
            &options,
            &providers,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(names(&requests), vec!["R", "lme4"]);
    }

    #[test]
    fn ide_is_appended_last() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let options = ExpandOptions {
            include_ide: true,
            ..Default::default()
        };

        let requests = expand(
            &PackageSelection::Explicit(vec!["mgcv".to_string()]),
            &options,
            &providers,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(names(&requests), vec!["R", "mgcv", "RStudio"]);
        assert_eq!(requests.last().map(|r| r.role), Some(CitationRole::Ide));
    }

    #[test]
    fn base_runtime_can_be_excluded() {
        let metadata = NoMetadata;
        let providers = Providers::new(&metadata);
        let options = ExpandOptions {
            include_base: false,
            ..Default::default()
        };

        let requests = expand(
            &PackageSelection::Explicit(vec!["mgcv".to_string()]),
            &options,
            &providers,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(names(&requests), vec!["mgcv"]);
    }
}
