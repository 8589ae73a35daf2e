//! BibTeX formatting
//!
//! Writes entries back out with braced values, bare numeric values, and
//! escaping of BibTeX special characters that are not already escaped.

use crate::entry::Entry;

/// Format one entry
pub fn format_entry(entry: &Entry) -> String {
    let mut out = String::new();
    out.push('@');
    out.push_str(entry.kind.as_str());
    out.push('{');
    out.push_str(&entry.key);
    out.push_str(",\n");

    for field in &entry.fields {
        out.push_str("  ");
        out.push_str(&field.name);
        out.push_str(" = ");
        out.push_str(&delimit_value(&field.value));
        out.push_str(",\n");
    }

    out.push('}');
    out
}

/// Format a sequence of entries separated by blank lines
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Choose delimiters for a field value: bare for pure numbers, braces
/// otherwise (preserves LaTeX commands and case-protection braces)
fn delimit_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{{{}}}", escape_value(value))
}

/// Escape BibTeX special characters that are not already escaped
///
/// Braces are left alone: providers use them for grouping and case
/// protection, and escaping them would corrupt nested values.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(&next) = chars.peek() {
                    out.push(next);
                    chars.next();
                }
            }
            '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
