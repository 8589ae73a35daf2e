//! Citation records and citekeys

use gratia_bibtex::{Entry, EntryKind, Field};
use serde::{Deserialize, Serialize};

use crate::normalize::Fingerprint;

/// Unique citekey within one run's table
///
/// Keys derive from the owning package's name (e.g. `lme4`), with a numeric
/// suffix from `2` on for a package's second-or-later distinct record. They
/// are not stable across runs: a changed package set or changed metadata can
/// shift suffixes, so prose that embeds keys by hand must expect drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationKey(String);

impl CitationKey {
    pub fn new(key: impl Into<String>) -> Self {
        CitationKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Inline citation marker, `@key`
    pub fn marker(&self) -> String {
        format!("@{}", self.0)
    }
}

impl std::fmt::Display for CitationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bibliographic entry
///
/// Created by the resolver, fingerprinted at construction, and immutable
/// afterwards except for the key the deduplicator attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Assigned by the deduplicator; `None` until then
    pub key: Option<CitationKey>,
    pub kind: EntryKind,
    pub title: String,
    /// BibTeX-style author list, `and`-joined
    pub author: String,
    pub year: Option<String>,
    /// Package and version annotation
    pub note: Option<String>,
    /// Fields carried through to the bibliography beyond the core four
    pub extra: Vec<Field>,
    /// Plain-text rendering for tabular output
    pub formatted: String,
    fingerprint: Fingerprint,
}

impl CitationRecord {
    pub fn new(
        kind: EntryKind,
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<String>,
        note: Option<String>,
        extra: Vec<Field>,
    ) -> Self {
        let title = title.into();
        let author = author.into();
        let fingerprint = Fingerprint::of(&title, &author, year.as_deref());
        let formatted = render_formatted(&author, year.as_deref(), &title, note.as_deref());
        Self {
            key: None,
            kind,
            title,
            author,
            year,
            note,
            extra,
            formatted,
            fingerprint,
        }
    }

    /// Build a record from a parsed BibTeX entry, overriding the note with
    /// the resolved package-version annotation when one is supplied
    pub fn from_entry(entry: &Entry, note: Option<String>) -> Self {
        let core = ["title", "author", "year", "note"];
        let extra: Vec<Field> = entry
            .fields
            .iter()
            .filter(|f| !core.contains(&f.name.to_ascii_lowercase().as_str()))
            .cloned()
            .collect();

        Self::new(
            entry.kind,
            entry.title().unwrap_or_default(),
            entry.author().unwrap_or_default(),
            entry.year().map(str::to_string),
            note.or_else(|| entry.note().map(str::to_string)),
            extra,
        )
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Return a copy carrying the assigned key
    pub fn with_key(&self, key: CitationKey) -> Self {
        let mut record = self.clone();
        record.key = Some(key);
        record
    }

    /// Convert to a BibTeX entry under the given key
    pub fn to_entry(&self, key: &str) -> Entry {
        let mut entry = Entry::new(key, self.kind);
        if !self.title.is_empty() {
            entry.push_field("title", &self.title);
        }
        if !self.author.is_empty() {
            entry.push_field("author", &self.author);
        }
        if let Some(year) = &self.year {
            entry.push_field("year", year);
        }
        if let Some(note) = &self.note {
            entry.push_field("note", note);
        }
        for field in &self.extra {
            entry.push_field(&field.name, &field.value);
        }
        entry
    }
}

/// Plain-text rendering: `Author (Year). Title. Note.`
fn render_formatted(author: &str, year: Option<&str>, title: &str, note: Option<&str>) -> String {
    let mut out = String::new();
    if !author.is_empty() {
        out.push_str(author);
        if let Some(year) = year {
            out.push_str(&format!(" ({})", year));
        }
        out.push_str(". ");
    } else if let Some(year) = year {
        out.push_str(&format!("({}). ", year));
    }
    out.push_str(title);
    if !title.ends_with('.') {
        out.push('.');
    }
    if let Some(note) = note {
        out.push(' ');
        out.push_str(note);
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratia_bibtex::parse_one;

    #[test]
    fn record_from_entry_keeps_extra_fields() {
        let entry = parse_one(
            r#"@Article{x,
                title = {Welcome to the Tidyverse},
                author = {Hadley Wickham},
                year = {2019},
                journal = {Journal of Open Source Software},
                doi = {10.21105/joss.01686},
            }"#,
        )
        .unwrap();

        let record = CitationRecord::from_entry(&entry, None);
        assert_eq!(record.title, "Welcome to the Tidyverse");
        assert_eq!(record.extra.len(), 2);
        assert!(record.extra.iter().any(|f| f.name == "doi"));
    }

    #[test]
    fn note_override_wins_over_entry_note() {
        let entry = parse_one(r#"@Manual{x, title = {T}, note = {old}, }"#).unwrap();
        let record =
            CitationRecord::from_entry(&entry, Some("R package version 2.0".to_string()));
        assert_eq!(record.note.as_deref(), Some("R package version 2.0"));
    }

    #[test]
    fn fingerprint_survives_key_attachment() {
        let record = CitationRecord::new(
            EntryKind::Manual,
            "Title",
            "Author",
            Some("2024".to_string()),
            None,
            Vec::new(),
        );
        let keyed = record.with_key(CitationKey::new("title2"));
        assert_eq!(record.fingerprint(), keyed.fingerprint());
        assert_eq!(keyed.key.as_ref().map(CitationKey::as_str), Some("title2"));
    }

    #[test]
    fn to_entry_round_trips_core_fields() {
        let record = CitationRecord::new(
            EntryKind::Manual,
            "lme4: Linear Mixed-Effects Models",
            "Douglas Bates",
            Some("2015".to_string()),
            Some("R package version 1.1-35".to_string()),
            Vec::new(),
        );
        let entry = record.to_entry("lme4");
        assert_eq!(entry.key, "lme4");
        assert_eq!(entry.title(), Some("lme4: Linear Mixed-Effects Models"));
        assert_eq!(entry.note(), Some("R package version 1.1-35"));
    }

    #[test]
    fn formatted_text_reads_naturally() {
        let record = CitationRecord::new(
            EntryKind::Manual,
            "mgcv: Mixed GAM Computation Vehicle",
            "Simon Wood",
            Some("2023".to_string()),
            Some("R package version 1.9-1".to_string()),
            Vec::new(),
        );
        assert_eq!(
            record.formatted,
            "Simon Wood (2023). mgcv: Mixed GAM Computation Vehicle. R package version 1.9-1."
        );
    }
}
