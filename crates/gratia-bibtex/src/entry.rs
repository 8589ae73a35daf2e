//! BibTeX entry data structures

use serde::{Deserialize, Serialize};

/// BibTeX entry kind
///
/// Covers the kinds that show up in package citation metadata. R package
/// citations are usually `@Manual`, with `@Article` or `@Book` for an
/// associated paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Article,
    Book,
    InCollection,
    InProceedings,
    Manual,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Software,
    Unknown,
}

impl EntryKind {
    /// Parse an entry kind from its BibTeX name (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::TechReport,
            "software" => Self::Software,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase name used when writing the entry
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Software => "software",
            Self::Unknown => "misc",
        }
    }
}

/// One field of an entry (key-value pair, insertion order preserved)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A BibTeX entry
///
/// Fields keep insertion order so a formatted entry round-trips in the
/// order the producer wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub kind: EntryKind,
    pub fields: Vec<Field>,
}

impl Entry {
    pub fn new(key: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            key: key.into(),
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping any existing field with the same name
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Set a field, replacing an existing one of the same name
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        match self.fields.iter_mut().find(|f| f.name.eq_ignore_ascii_case(name)) {
            Some(field) => field.value = value.into(),
            None => self.push_field(name, value),
        }
    }

    /// Look up a field value by name (case-insensitive)
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.field("author")
    }

    pub fn year(&self) -> Option<&str> {
        self.field("year")
    }

    pub fn note(&self) -> Option<&str> {
        self.field("note")
    }

    /// Builder-style field append, used by the fixed citations in gratia-core
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_field(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("manual", EntryKind::Manual; "lowercase manual")]
    #[test_case("Manual", EntryKind::Manual; "capitalized manual")]
    #[test_case("ARTICLE", EntryKind::Article; "uppercase article")]
    #[test_case("conference", EntryKind::InProceedings; "conference alias")]
    #[test_case("webpage", EntryKind::Unknown; "unknown kind")]
    fn parse_kind(input: &str, expected: EntryKind) {
        assert_eq!(EntryKind::parse(input), expected);
    }

    #[test]
    fn field_access_is_case_insensitive() {
        let mut entry = Entry::new("lme4", EntryKind::Article);
        entry.push_field("Title", "Fitting Linear Mixed-Effects Models");
        entry.push_field("AUTHOR", "Douglas Bates");
        entry.push_field("year", "2015");

        assert_eq!(entry.title(), Some("Fitting Linear Mixed-Effects Models"));
        assert_eq!(entry.author(), Some("Douglas Bates"));
        assert_eq!(entry.year(), Some("2015"));
        assert_eq!(entry.note(), None);
    }

    #[test]
    fn set_field_replaces_existing() {
        let mut entry = Entry::new("mgcv", EntryKind::Manual);
        entry.push_field("note", "R package version 1.8-0");
        entry.set_field("note", "R package version 1.9-1");

        assert_eq!(entry.note(), Some("R package version 1.9-1"));
        assert_eq!(entry.fields.len(), 1);
    }

    #[test]
    fn unknown_kind_formats_as_misc() {
        assert_eq!(EntryKind::Unknown.as_str(), "misc");
    }
}
