//! Parses Markdown drafts into [`ArticleRecord`]s. A draft carries a free-form
//! metadata block, a line consisting of `---`, and a Markdown body. For
//! example:
//!
//! ```md
//! **SEO Title (max 60 chars):**
//! Zero Trust Architecture: A 2024 Guide
//!
//! Meta Description:
//! What zero trust means for enterprise networks.
//!
//! Keywords:
//! 1. zero trust
//! 2. network security
//! ---
//! # Zero Trust Architecture
//!
//! Never trust, always verify.
//! ```
//!
//! Metadata values are found with a small grammar rather than a schema: a
//! label line ending in either the bold form (`**SEO Title...**`) or the
//! colon form (`SEO Title...:`) is followed by the value on the next
//! non-blank line.

use crate::article::{
    or_default, truncate_chars, ArticleRecord, DEFAULT_DRAFT_TITLE,
    DEFAULT_KEYWORDS, DEFAULT_META_DESCRIPTION, MAX_KEYWORDS,
    META_DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::markdown;
use std::fmt;

const SEPARATOR: &str = "---";
const TITLE_LABEL: &str = "seo title";
const META_DESCRIPTION_LABEL: &str = "meta description";

/// Parses the contents of a Markdown draft into an [`ArticleRecord`].
///
/// * The title is the value of the `SEO Title` label, else the first level-1
///   heading of the body, else [`DEFAULT_DRAFT_TITLE`].
/// * The meta description is the value of the `Meta Description` label,
///   else [`DEFAULT_META_DESCRIPTION`].
/// * The keywords are the first five non-blank numbered list items
///   (`1. term`) of the metadata block, else [`DEFAULT_KEYWORDS`].
/// * The body is converted to HTML with [`markdown::to_html`].
pub fn parse_draft(text: &str) -> Result<ArticleRecord> {
    let (meta, body) = split(text)?;
    let (meta, body) = (meta.trim(), body.trim());

    let title = label_value(meta, TITLE_LABEL)
        .or_else(|| first_heading(body))
        .map(|title| truncate_chars(title, TITLE_MAX_CHARS).to_owned())
        .unwrap_or_default();

    let meta_description = label_value(meta, META_DESCRIPTION_LABEL)
        .map(|description| {
            truncate_chars(description, META_DESCRIPTION_MAX_CHARS).to_owned()
        })
        .unwrap_or_default();

    Ok(ArticleRecord {
        title: or_default(title, DEFAULT_DRAFT_TITLE),
        meta_description: or_default(
            meta_description,
            DEFAULT_META_DESCRIPTION,
        ),
        keywords: or_default(keywords(meta).join(", "), DEFAULT_KEYWORDS),
        content_html: markdown::to_html(body),
    })
}

// Splits the draft around its single `---` line.
fn split(text: &str) -> Result<(&str, &str)> {
    let mut separators = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(&['\n', '\r'][..]) == SEPARATOR {
            separators.push((offset, offset + line.len()));
        }
        offset += line.len();
    }

    match separators.as_slice() {
        [(start, end)] => Ok((&text[..*start], &text[*end..])),
        _ => Err(Error::Separator(separators.len())),
    }
}

/// Returns the trimmed value on the first non-blank line after a line
/// labeled with `label`. Lines are scanned in order and the first label
/// line that is followed by a value wins.
fn label_value<'a>(meta: &'a str, label: &str) -> Option<&'a str> {
    let lines: Vec<&str> = meta.lines().collect();
    lines.iter().enumerate().find_map(|(i, line)| {
        if !is_label_line(line, label) {
            return None;
        }
        lines[i + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    })
}

fn is_label_line(line: &str, label: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    is_bold_label(&lower, label) || is_colon_label(&lower, label)
}

// `**<label><anything but *>**` with only whitespace after it.
fn is_bold_label(lower: &str, label: &str) -> bool {
    let prefix = format!("**{}", label);
    lower.match_indices(&prefix).any(|(i, _)| {
        let rest = &lower[i + prefix.len()..];
        match rest.find('*') {
            Some(j) => rest[j..]
                .strip_prefix("**")
                .map_or(false, |tail| tail.trim().is_empty()),
            None => false,
        }
    })
}

// `<label><anything>:` with only whitespace after the colon.
fn is_colon_label(lower: &str, label: &str) -> bool {
    let trimmed = lower.trim_end();
    match (lower.find(label), trimmed.rfind(':')) {
        (Some(i), Some(colon)) => {
            trimmed.ends_with(':') && i + label.len() <= colon
        }
        _ => false,
    }
}

fn first_heading(body: &str) -> Option<&str> {
    body.lines().find_map(|line| {
        let rest = line.strip_prefix('#')?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let title = rest.trim();
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    })
}

fn keywords(meta: &str) -> Vec<&str> {
    meta.lines()
        .filter_map(numbered_item)
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .take(MAX_KEYWORDS)
        .collect()
}

// `<digits>.<whitespace><term>`
fn numbered_item(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    let rest = rest.strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest)
}

/// Represents the result of a draft-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a Markdown draft.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when the draft doesn't contain exactly one `---` line
    /// separating the metadata block from the body. Holds the number of
    /// separator lines found.
    Separator(usize),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Separator(found) => write!(
                f,
                "Draft must contain exactly one '---' separating metadata \
                 from body (found {}).",
                found
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    const DRAFT: &str = "**SEO Title (max 60 characters):**

Zero Trust Architecture: A 2024 Guide

**Meta Description:**
What zero trust means for enterprise networks.

**Keywords:**
1. zero trust
2. network security
3. identity
4. access control
5. compliance
6. overflow
---
# Zero Trust Architecture

Never trust,
always verify.
";

    #[test]
    fn test_parse_bold_labels() -> Result<()> {
        let record = parse_draft(DRAFT)?;
        assert_eq!("Zero Trust Architecture: A 2024 Guide", record.title);
        assert_eq!(
            "What zero trust means for enterprise networks.",
            record.meta_description
        );
        assert_eq!(
            "zero trust, network security, identity, access control, \
             compliance",
            record.keywords
        );
        let heading = "<h1>Zero Trust Architecture</h1>";
        assert!(record.content_html.contains(heading));
        assert!(record.content_html.contains("Never trust,<br />"));
        Ok(())
    }

    #[test]
    fn test_parse_colon_labels() -> Result<()> {
        let record = parse_draft(
            "## SEO Title (60 chars):\nColon Title\n\
             meta description:\nColon description\n---\nBody\n",
        )?;
        assert_eq!("Colon Title", record.title);
        assert_eq!("Colon description", record.meta_description);
        Ok(())
    }

    #[test]
    fn test_inline_label_value_is_not_a_label() -> Result<()> {
        let draft = "**SEO Title:** Inline\n\nx\n---\n# Heading Title\n";
        let record = parse_draft(draft)?;
        assert_eq!("Heading Title", record.title);
        Ok(())
    }

    #[test]
    fn test_title_falls_back_to_heading() -> Result<()> {
        let draft = "Notes\n---\nIntro\n\n## Not this\n# Heading Title\n";
        let record = parse_draft(draft)?;
        assert_eq!("Heading Title", record.title);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let record = parse_draft("nothing useful\n---\nplain body\n")?;
        assert_eq!(DEFAULT_DRAFT_TITLE, record.title);
        assert_eq!(DEFAULT_META_DESCRIPTION, record.meta_description);
        assert_eq!(DEFAULT_KEYWORDS, record.keywords);
        assert_eq!("<p>plain body</p>\n", record.content_html);
        Ok(())
    }

    #[test]
    fn test_title_is_truncated() -> Result<()> {
        let draft = format!("SEO Title:\n{}\n---\nbody\n", "x".repeat(90));
        assert_eq!("x".repeat(60), parse_draft(&draft)?.title);
        Ok(())
    }

    #[test]
    fn test_label_without_value_falls_through() -> Result<()> {
        let record = parse_draft("Meta Description:\n\n   \n---\nbody\n")?;
        assert_eq!(DEFAULT_META_DESCRIPTION, record.meta_description);
        Ok(())
    }

    #[test]
    fn test_blank_keyword_items_take_no_slot() -> Result<()> {
        let record = parse_draft(
            "Keywords:\n1. a\n2. \n3. b\n4. c\n5. d\n6. e\n7. f\n---\nbody\n",
        )?;
        assert_eq!("a, b, c, d, e", record.keywords);
        Ok(())
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        assert_eq!(
            Err(Error::Separator(0)),
            parse_draft("SEO Title:\nX\n# body\n")
        );
    }

    #[test]
    fn test_two_separators_are_rejected() {
        assert_eq!(
            Err(Error::Separator(2)),
            parse_draft("SEO Title:\nX\n---\nbody\n---\nmore\n")
        );
    }

    #[test]
    fn test_dashes_inside_a_line_are_not_separators() -> Result<()> {
        let record = parse_draft("SEO Title:\nX --- Y\n---\nbody\n")?;
        assert_eq!("X --- Y", record.title);
        Ok(())
    }
}
