//! BibTeX parser built on nom
//!
//! Handles the subset of BibTeX that citation metadata providers emit:
//! regular entries with braced, quoted, or numeric field values, nested
//! braces, `#` string concatenation, and `@string` definitions. `@comment`
//! and `@preamble` blocks are skipped. A malformed entry is recorded as an
//! issue and parsing resumes at the next `@`, so one broken entry does not
//! discard the rest of the provider's output.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use crate::entry::{Entry, EntryKind};

/// A recoverable problem encountered while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub line: u32,
    pub message: String,
}

/// Entries recovered from a BibTeX string, plus any skipped regions
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub entries: Vec<Entry>,
    pub issues: Vec<ParseIssue>,
}

/// Unrecoverable parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("input contains no BibTeX entries")]
    NoEntries,
}

/// Parse all entries in the input
pub fn parse_entries(input: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut strings: HashMap<String, String> = HashMap::new();

    let mut remaining = input;
    let mut line = 1u32;

    loop {
        let (rest, skipped) = eat_blank(remaining);
        line += skipped.matches('\n').count() as u32;
        remaining = rest;
        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            // Stray text between entries; skip to the next block
            match remaining.find('@') {
                Some(pos) => {
                    line += remaining[..pos].matches('\n').count() as u32;
                    remaining = &remaining[pos..];
                }
                None => break,
            }
            continue;
        }

        match block(remaining, &strings) {
            Ok((rest, parsed)) => {
                line += remaining[..remaining.len() - rest.len()]
                    .matches('\n')
                    .count() as u32;
                match parsed {
                    Block::Entry(entry) => outcome.entries.push(entry),
                    Block::StringDef(name, value) => {
                        strings.insert(name, value);
                    }
                    Block::Skipped => {}
                }
                remaining = rest;
            }
            Err(_) => {
                outcome.issues.push(ParseIssue {
                    line,
                    message: "malformed entry".to_string(),
                });
                // Resume at the next @ after the failing one
                match remaining[1..].find('@') {
                    Some(pos) => remaining = &remaining[pos + 1..],
                    None => break,
                }
            }
        }
    }

    outcome
}

/// Parse exactly one entry, failing if the input contains none
pub fn parse_one(input: &str) -> Result<Entry, ParseError> {
    parse_entries(input)
        .entries
        .into_iter()
        .next()
        .ok_or(ParseError::NoEntries)
}

enum Block {
    Entry(Entry),
    StringDef(String, String),
    Skipped,
}

/// Skip whitespace and `%` line comments
fn eat_blank(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'%' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else {
            break;
        }
    }
    (&input[pos..], &input[..pos])
}

fn block<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, Block> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, kind_name) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match kind_name.to_ascii_lowercase().as_str() {
        "string" => {
            let (rest, (name, value)) = string_definition(rest, strings)?;
            Ok((rest, Block::StringDef(name, value)))
        }
        "preamble" | "comment" => {
            let (rest, _) = braced_block(rest)?;
            Ok((rest, Block::Skipped))
        }
        _ => {
            let (rest, entry) = entry_body(rest, kind_name, strings)?;
            Ok((rest, Block::Entry(entry)))
        }
    }
}

fn string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, name) = field_name(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (name.to_string(), value)))
}

fn entry_body<'a>(
    input: &'a str,
    kind_name: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Entry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let mut entry = Entry::new(key, EntryKind::parse(kind_name));
    let mut remaining = rest;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if let Some(stripped) = rest.strip_prefix('}') {
            return Ok((stripped, entry));
        }

        let (rest, name) = field_name(rest)?;
        let (rest, _) = multispace0(rest)?;
        let (rest, _) = char('=')(rest)?;
        let (rest, value) = field_value(rest, strings)?;
        entry.push_field(name, value);

        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
    }
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// A value: braced, quoted, bare number, or @string reference, possibly
/// concatenated with `#`
fn field_value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            braced_value,
            quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(field_name, |name: &str| {
                strings.get(name).cloned().unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;
        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

fn braced_value(input: &str) -> IResult<&str, String> {
    let (rest, raw) = braced_block(input)?;
    Ok((rest, raw[1..raw.len() - 1].to_string()))
}

/// Match a `{...}` block with balanced nested braces, returning it verbatim
fn braced_block(input: &str) -> IResult<&str, &str> {
    let trimmed = input.trim_start();
    let offset = input.len() - trimmed.len();
    if !trimmed.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let bytes = trimmed.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((
                        &input[offset + pos + 1..],
                        &input[offset..offset + pos + 1],
                    ));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let bytes = input.as_bytes();
    let mut result = String::new();
    let mut depth = 0usize;
    let mut pos = 1usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if depth == 0 => return Ok((&input[pos + 1..], result)),
            b'{' => {
                depth += 1;
                result.push('{');
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                result.push('}');
            }
            b'\\' if pos + 1 < bytes.len() => {
                result.push('\\');
                pos += 1;
                result.push(bytes[pos] as char);
            }
            c => result.push(c as char),
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_manual_entry() {
        let input = r#"
@Manual{mgcv,
    title = {mgcv: Mixed GAM Computation Vehicle},
    author = {Simon Wood},
    year = {2023},
    note = {R package version 1.9-1},
}
"#;
        let outcome = parse_entries(input);
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.entries.len(), 1);

        let entry = &outcome.entries[0];
        assert_eq!(entry.key, "mgcv");
        assert_eq!(entry.kind, EntryKind::Manual);
        assert_eq!(entry.author(), Some("Simon Wood"));
        assert_eq!(entry.note(), Some("R package version 1.9-1"));
    }

    #[test]
    fn parses_quoted_and_numeric_values() {
        let input = r#"
@Article{lme4paper,
    author = "Douglas Bates and Martin Maechler",
    title = "Fitting Linear Mixed-Effects Models Using lme4",
    year = 2015,
}
"#;
        let entry = parse_one(input).unwrap();
        assert_eq!(entry.year(), Some("2015"));
        assert_eq!(
            entry.author(),
            Some("Douglas Bates and Martin Maechler")
        );
    }

    #[test]
    fn keeps_nested_braces() {
        let input = "@Manual{x, title = {The {GAM} Book}, }";
        let entry = parse_one(input).unwrap();
        assert_eq!(entry.title(), Some("The {GAM} Book"));
    }

    #[test]
    fn resolves_string_definitions() {
        let input = r#"
@string{jss = {Journal of Statistical Software}}
@Article{a, journal = jss, }
"#;
        let outcome = parse_entries(input);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(
            outcome.entries[0].field("journal"),
            Some("Journal of Statistical Software")
        );
    }

    #[test]
    fn concatenates_with_hash() {
        let input = r#"
@string{pre = {R package}}
@Manual{m, note = pre # { version 2.0}, }
"#;
        let outcome = parse_entries(input);
        assert_eq!(
            outcome.entries[0].note(),
            Some("R package version 2.0")
        );
    }

    #[test]
    fn recovers_after_a_malformed_entry() {
        let input = r#"
@Manual{broken
@Manual{ok, title = {Fine}, }
"#;
        let outcome = parse_entries(input);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].key, "ok");
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn multiple_entries_keep_order() {
        let input = r#"
@Manual{first, title = {A}, }
@Article{second, title = {B}, }
"#;
        let outcome = parse_entries(input);
        let keys: Vec<_> = outcome.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn empty_input_yields_no_entries() {
        assert!(matches!(parse_one("  \n"), Err(ParseError::NoEntries)));
    }

    #[test]
    fn skips_comment_blocks() {
        let input = r#"
@comment{ nothing to see }
@Manual{real, title = {Kept}, }
"#;
        let outcome = parse_entries(input);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].key, "real");
    }
}
