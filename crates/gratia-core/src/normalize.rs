//! Text normalization for deduplication fingerprints
//!
//! Two records are duplicates when their normalized title, author, and
//! year coincide. Normalization folds Unicode (NFKD), keeps only ASCII
//! alphanumerics and spaces, lowercases, collapses whitespace, and strips
//! leading articles from titles, so case, diacritics, punctuation, and
//! spacing differences never split a shared citation.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Content fingerprint of a citation record
///
/// Derived from bibliographic content only, never from an assigned citekey,
/// so records with different keys but identical content still collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Build a fingerprint from the three identity fields
    pub fn of(title: &str, author: &str, year: Option<&str>) -> Self {
        Fingerprint(format!(
            "{}|{}|{}",
            normalize_title(title),
            normalize_text(author),
            year.map(normalize_text).unwrap_or_default(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize free text: NFKD fold, ASCII alphanumerics and spaces only,
/// lowercase, collapsed whitespace
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();

    collapse_whitespace(&folded.to_lowercase())
}

/// Normalize a title: `normalize_text` plus stripping a leading article
pub fn normalize_title(title: &str) -> String {
    let mut result = normalize_text(title);
    for article in ["a ", "an ", "the "] {
        if let Some(rest) = result.strip_prefix(article) {
            result = rest.to_string();
            break;
        }
    }
    result
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("The Tidyverse Manifesto", "tidyverse manifesto"; "strips leading article")]
    #[test_case("Études  Françaises", "etudes francaises"; "folds diacritics and whitespace")]
    #[test_case("mgcv: Mixed GAM, Computation!", "mgcv mixed gam computation"; "drops punctuation")]
    #[test_case("An Analysis", "analysis"; "strips an")]
    fn title_normalization(input: &str, expected: &str) {
        assert_eq!(normalize_title(input), expected);
    }

    #[test]
    fn text_normalization_is_case_insensitive() {
        assert_eq!(normalize_text("Douglas BATES"), normalize_text("douglas bates"));
    }

    #[test]
    fn fingerprint_ignores_formatting_differences() {
        let a = Fingerprint::of(
            "Fitting Linear Mixed-Effects Models",
            "Bates, Douglas and Maechler, Martin",
            Some("2015"),
        );
        let b = Fingerprint::of(
            "fitting linear  mixed effects models",
            "Bates, Douglas and Maechler, Martin",
            Some("2015"),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_separates_different_years() {
        let a = Fingerprint::of("Title", "Author", Some("2015"));
        let b = Fingerprint::of("Title", "Author", Some("2016"));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_year_is_distinct_from_any_year() {
        let a = Fingerprint::of("Title", "Author", None);
        let b = Fingerprint::of("Title", "Author", Some("2015"));
        assert_ne!(a, b);
    }
}
