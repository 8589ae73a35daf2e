//! Deduplication and citekey assignment
//!
//! Walks resolved citations in package-discovery order and records in
//! priority order, keyed by content fingerprint. A fingerprint seen before
//! reuses its existing key and canonical record, so a citation shared by
//! several packages appears under each of them but lands in the
//! bibliography exactly once. New fingerprints get a key slugged from the
//! owning package's name, with a numeric suffix from 2 on any collision.

use std::collections::{HashMap, HashSet};

use crate::domain::{CitationKey, CitationRecord, PackageCitation, PackageTable};
use crate::normalize::Fingerprint;

/// Produce the final table: same package order, deduplicated records with
/// assigned keys, and the flat first-seen citekey sequence
pub fn finalize(citations: Vec<PackageCitation>) -> PackageTable {
    let mut canonical: HashMap<Fingerprint, CitationRecord> = HashMap::new();
    let mut used_keys: HashSet<String> = HashSet::new();
    let mut citekeys: Vec<CitationKey> = Vec::new();
    let mut packages = Vec::with_capacity(citations.len());

    for citation in citations {
        let mut records = Vec::with_capacity(citation.records.len());
        for record in &citation.records {
            match canonical.get(record.fingerprint()) {
                Some(existing) => {
                    // Shared citation; reference it once per package
                    if !records.iter().any(|r: &CitationRecord| r.key == existing.key) {
                        records.push(existing.clone());
                    }
                }
                None => {
                    let key = assign_key(&citation.package, &mut used_keys);
                    let keyed = record.with_key(key.clone());
                    canonical.insert(record.fingerprint().clone(), keyed.clone());
                    citekeys.push(key);
                    records.push(keyed);
                }
            }
        }

        packages.push(PackageCitation {
            package: citation.package,
            version: citation.version,
            group_label: citation.group_label,
            role: citation.role,
            records,
        });
    }

    PackageTable { packages, citekeys }
}

/// Next free key for a record owned by `package`
fn assign_key(package: &str, used: &mut HashSet<String>) -> CitationKey {
    let slug = slug(package);
    let mut candidate = slug.clone();
    let mut suffix = 2u32;
    while used.contains(&candidate) {
        candidate = format!("{}{}", slug, suffix);
        suffix += 1;
    }
    used.insert(candidate.clone());
    CitationKey::new(candidate)
}

/// Citekey-safe form of a package name
fn slug(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if cleaned.is_empty() {
        "pkg".to_string()
    } else {
        cleaned
    }
}
