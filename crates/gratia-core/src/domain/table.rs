//! The final package table

use serde::{Deserialize, Serialize};

use super::package::CitationRole;
use super::record::{CitationKey, CitationRecord};

/// One package identity with its ordered citation records
///
/// Records keep insertion order: most authoritative first. A record shared
/// with another package appears here too, carrying the shared key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageCitation {
    pub package: String,
    pub version: Option<String>,
    /// Set when this row is a synthetic umbrella for a folded group
    pub group_label: Option<String>,
    pub role: CitationRole,
    pub records: Vec<CitationRecord>,
}

impl PackageCitation {
    /// Keys of this package's records, in record order
    pub fn citekeys(&self) -> Vec<&CitationKey> {
        self.records.iter().filter_map(|r| r.key.as_ref()).collect()
    }
}

/// The final, ordered, deduplicated table
///
/// `citekeys` is the flat first-seen-order sequence of unique keys across
/// all packages. Every key referenced by any record appears exactly once
/// here, and every key here is referenced by at least one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageTable {
    pub packages: Vec<PackageCitation>,
    pub citekeys: Vec<CitationKey>,
}

impl PackageTable {
    /// The distinct records, one per citekey, in citekey order. This is the
    /// sequence the bibliography serializer writes.
    pub fn distinct_records(&self) -> Vec<&CitationRecord> {
        self.citekeys
            .iter()
            .filter_map(|key| self.record_for_key(key))
            .collect()
    }

    /// First record carrying the given key, searching in package order
    pub fn record_for_key(&self, key: &CitationKey) -> Option<&CitationRecord> {
        self.packages
            .iter()
            .flat_map(|p| p.records.iter())
            .find(|r| r.key.as_ref() == Some(key))
    }

    pub fn package_names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.package.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
