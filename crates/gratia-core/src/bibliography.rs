//! Bibliography serialization
//!
//! Writes one BibTeX entry per distinct record, in flat citekey order.
//! Output goes to a temporary file in the target directory first and is
//! persisted atomically, so a failed run never leaves a partial
//! bibliography behind.

use std::io::Write;
use std::path::Path;

use crate::domain::PackageTable;
use crate::error::CitationError;

/// Write the table's bibliography to `path`, overwriting any existing file
pub fn write_bibliography(table: &PackageTable, path: &Path) -> Result<(), CitationError> {
    let entries: Vec<_> = table
        .distinct_records()
        .into_iter()
        .filter_map(|record| {
            record
                .key
                .as_ref()
                .map(|key| record.to_entry(key.as_str()))
        })
        .collect();

    let mut text = gratia_bibtex::format_entries(entries.iter());
    text.push('\n');

    write_atomic(path, &text)
}

/// Write `contents` to `path` via a temporary file and an atomic rename
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), CitationError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let failed = |source: std::io::Error| CitationError::Serialization {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(contents.as_bytes()).map_err(failed)?;
    tmp.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::finalize;
    use crate::domain::{CitationRecord, CitationRole, PackageCitation};
    use gratia_bibtex::{parse_entries, EntryKind};

    fn table() -> PackageTable {
        let shared = CitationRecord::new(
            EntryKind::Article,
            "Shared Paper",
            "Author",
            Some("2020".to_string()),
            None,
            Vec::new(),
        );
        finalize(vec![
            PackageCitation {
                package: "lme4".to_string(),
                version: Some("1.1-35".to_string()),
                group_label: None,
                role: CitationRole::Package,
                records: vec![
                    CitationRecord::new(
                        EntryKind::Manual,
                        "lme4: Linear Mixed-Effects Models",
                        "Douglas Bates",
                        Some("2023".to_string()),
                        Some("R package version 1.1-35".to_string()),
                        Vec::new(),
                    ),
                    shared.clone(),
                ],
            },
            PackageCitation {
                package: "mgcv".to_string(),
                version: None,
                group_label: None,
                role: CitationRole::Package,
                records: vec![shared],
            },
        ])
    }

    #[test]
    fn writes_each_distinct_record_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");

        write_bibliography(&table(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let outcome = parse_entries(&written);
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(written.matches("Shared Paper").count(), 1);
    }

    #[test]
    fn rerun_overwrites_with_equivalent_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");

        write_bibliography(&table(), &path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        write_bibliography(&table(), &path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unwritable_path_is_a_serialization_error() {
        let missing = Path::new("/definitely/not/a/dir/refs.bib");
        let err = write_bibliography(&table(), missing).unwrap_err();
        assert!(matches!(err, CitationError::Serialization { .. }));
        assert!(err.to_string().contains("refs.bib"));
    }

    #[test]
    fn entry_keys_follow_citekey_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");

        let t = table();
        write_bibliography(&t, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let outcome = parse_entries(&written);
        let keys: Vec<_> = outcome.entries.iter().map(|e| e.key.as_str()).collect();
        let expected: Vec<_> = t.citekeys.iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, expected);
    }
}
